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

use clap::{CommandFactory, Parser};
use owo_colors::{OwoColorize, Stream, Style};

use socksies::{
    app::{dispatch_command, initialize_app},
    cli::Cli,
    error::exit_code_for,
    ui::should_use_colors,
    utils::init_logging,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command.as_ref() else {
        // No subcommand: show help rather than guessing an action
        let _ = Cli::command().print_help();
        println!();
        return;
    };

    init_logging(cli.verbose);
    owo_colors::set_override(should_use_colors());

    let result = match initialize_app(&cli).await {
        Ok(ctx) => dispatch_command(command, &ctx.table, &ctx.control).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        let error_style = Style::new().red().bold();
        eprintln!(
            "{} {:#}",
            "Error:".if_supports_color(Stream::Stderr, |t| t.style(error_style)),
            e
        );
        std::process::exit(exit_code_for(&e));
    }
}
