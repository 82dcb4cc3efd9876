use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use luxcast::{Args, OutputFormat, fake_bridge_controller, run_with_log_level};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let mut stdout = std::io::stdout();

    let run_result = async {
        let log_level = args.log_level();
        let output_format = args.output_format().unwrap_or(if stdout.is_terminal() {
            OutputFormat::Pretty
        } else {
            OutputFormat::Json
        });
        let (command, options, fake_args) = args.into_command_and_backend()?;
        let controller = fake_bridge_controller(fake_args);

        run_with_log_level(
            command,
            options,
            &mut stdout,
            controller,
            log_level,
            output_format,
        )
        .await
    }
    .await;

    match run_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
