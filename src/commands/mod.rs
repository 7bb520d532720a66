// Copyright 2025 Derek Smiley
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod connect;
pub mod disconnect;
pub mod info;
pub mod list;
pub mod status;

pub use connect::{connect_proxy, ConnectOutcome};
pub use disconnect::{disconnect, disconnect_all, disconnect_proxy, DisconnectSummary};
pub use info::{proxy_details, show_proxy_info};
pub use list::{list_proxies, proxy_lines, write_proxy_list};
pub use status::{collect_status, show_status, ProxyStatus};
