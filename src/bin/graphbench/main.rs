mod app;

use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    let cli = app::parse();
    app::init_logging(cli.verbose);

    info!("Starting graphbench");

    let result = app::run(cli);

    info!("graphbench finished");

    result
}
