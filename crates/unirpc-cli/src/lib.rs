// Copyright 2025 unirpc Authors
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

//! # unirpc CLI
//!
//! Command-line interface for the unirpc welcome service.
//!
//! ## Key Commands
//!
//! - `unirpc serve`: Start the greeter server
//! - `unirpc call`: Send one welcome request and print the reply
//!
//! Configuration comes from flags, then `UNIRPC_*` environment variables,
//! then defaults. See [`config`].

pub mod config;
