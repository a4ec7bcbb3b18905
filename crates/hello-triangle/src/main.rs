mod cli;
mod run;

use anyhow::Result;

fn main() -> Result<()> {
    let _cli = cli::parse();
    run::initialise_tracing();
    run::run()
}
