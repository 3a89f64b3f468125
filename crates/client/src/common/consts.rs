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

//! Constants for the Rach protocol and client defaults.

use std::time::Duration;

/// Client type reported to the broker in the connection query string.
pub const RACH_CLIENT_TYPE: &str = "terminal";

/// Default topic namespace for a newly created client.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Default delay between the end of one transport session and the next
/// connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);
