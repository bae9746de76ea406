pub mod cmd;
pub mod opts;
pub mod prompt;
pub mod sink;

use self::cmd::{range, single, CmdError, Context, Outcome};
use self::opts::{MainOpts, Selector};
use std::io;

pub async fn execute_cmd(opts: MainOpts) -> Result<Outcome, CmdError> {
    let ctx = Context::new(&opts)?;
    let selector = opts.selector().ok_or(CmdError::MissingSelector)?;

    log::info!("Running query: {:?} at station {}", selector, opts.station_id);
    let outcome = match &selector {
        Selector::ById(id) => single::exec(&ctx, opts.station_id, *id).await?,
        Selector::ByDateRange(raw) => {
            let mut stdin = io::stdin().lock();
            range::exec(&ctx, opts.station_id, raw, &mut stdin).await?
        }
    };
    Ok(outcome)
}
