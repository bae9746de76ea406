use satnogs_fetch::error::Result;
use std::env;
use std::process;

const LOG_LEVEL: &str = "RUST_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let error_style = console::Style::new().red().bright();
    let result = execute().await;
    if let Err(err) = result {
        eprintln!("{}", error_style.apply_to(&err));
        process::exit(err.exit_code());
    }
}

async fn execute() -> Result<()> {
    let opts = satnogs_fetch::read_args();
    let remove_env = match opts.common_opts.verbose {
        1 => set_log_level("info"),
        n => {
            if n > 1 {
                set_log_level("debug")
            } else {
                false
            }
        }
    };
    env_logger::init();

    let result = satnogs_fetch::execute_cmd(opts).await;
    if remove_env {
        env::remove_var(LOG_LEVEL);
    }
    let outcome = result?;
    log::info!("Done: {}", outcome);
    Ok(())
}

fn set_log_level(level: &str) -> bool {
    let current = env::var_os(LOG_LEVEL);
    if current.is_none() {
        env::set_var(LOG_LEVEL, level);
        true
    } else {
        false
    }
}
