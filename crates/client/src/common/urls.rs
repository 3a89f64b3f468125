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

//! Connection URL preparation for the Rach broker.

use super::{consts::RACH_CLIENT_TYPE, credential::Credential};

/// Builds the full connection URL from a base path and optional credential.
///
/// Query values are appended raw, matching the broker's parser; absent
/// credentials become empty strings.
#[must_use]
pub fn prepare_connection_url(base: &str, credential: Option<&Credential>) -> String {
    let (username, password) = credential.map_or(("", ""), |c| (c.username(), c.password()));
    format!("{base}?type={RACH_CLIENT_TYPE}&username={username}&password={password}")
}
