use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use supplygraph::{CliArgs, ErrorCode, LoggingConfig, PipelineConfig, init_logging, run};

fn main() -> ExitCode {
    let logging_config = LoggingConfig::from_env();
    let _guard = match init_logging(logging_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    let cli = CliArgs::parse();

    let result = PipelineConfig::from_args(cli).and_then(|config| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let summary = run(&config, &mut out)?;
        out.flush()?;
        Ok(summary)
    });

    match result {
        Ok(summary) if summary.failed_queries > 0 => {
            tracing::warn!(
                failed = summary.failed_queries,
                queries = summary.queries,
                "some reports failed"
            );
            exit_code(ErrorCode::ReportFailure)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let code = ErrorCode::from_anyhow(&error);
            tracing::error!(
                code = code.code(),
                category = code.category(),
                error = %format!("{error:#}"),
                "supplygraph failed"
            );
            eprintln!("error: {error:#}");
            exit_code(code)
        }
    }
}

fn exit_code(code: ErrorCode) -> ExitCode {
    ExitCode::from(u8::try_from(code.code()).unwrap_or(1))
}
