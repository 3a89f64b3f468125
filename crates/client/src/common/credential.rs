// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Broker credential handling.

use std::fmt::Debug;

use ustr::Ustr;
use zeroize::ZeroizeOnDrop;

/// Username/password pair presented to the broker in the connection URL.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    pub username: Ustr,
    password: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] instance.
    #[must_use]
    pub fn new(username: String, password: String) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_credential_accessors() {
        let cred = Credential::new("robot".to_string(), "hunter2".to_string());
        assert_eq!(cred.username(), "robot");
        assert_eq!(cred.password(), "hunter2");
    }

    #[rstest]
    fn test_debug_redacts_password() {
        let cred = Credential::new("robot".to_string(), "hunter2".to_string());
        let output = format!("{cred:?}");
        assert!(output.contains("robot"));
        assert!(output.contains("<redacted>"));
        assert!(!output.contains("hunter2"));
    }
}
