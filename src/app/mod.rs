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

//! Application wiring: turn parsed arguments into a loaded proxy table and a
//! process controller, then route the subcommand.

pub mod dispatcher;
pub mod initialization;

pub use dispatcher::dispatch_command;
pub use initialization::{initialize_app, AppContext};
