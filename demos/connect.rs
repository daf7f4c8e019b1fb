// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

use std::env;

use nightcrawler_swift::{Connection, Options};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let options = match env::args().nth(1) {
        Some(path) => Options::from_file(path),
        None => Options::from_env(),
    }
    .expect("Failed to load connection options");

    let mut conn = Connection::new(options);
    let _ = conn.connect().await.expect("Failed to connect");

    println!("Token expires at {:?}", conn.expires_at());
    println!("Admin URL: {:?}", conn.admin_url());
    println!("Internal URL: {:?}", conn.internal_url());
    println!("Public URL: {:?}", conn.public_url());
    println!("Upload URL: {:?}", conn.upload_url());
}
