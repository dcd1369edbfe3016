use std::error::Error;
use std::io::{stdin, stdout};

use infix_calc::application::config::Config;
use infix_calc::application::{console, logging, server, ApplicationError};
use log::info;
use tokio::runtime::Builder;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    logging::init(config.log_level)?;

    let mut args = std::env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (None, _) => {
            console::run(stdin().lock(), stdout().lock())?;
        }
        (Some("serve"), None) => {
            info!("starting server on port {}", config.port);
            let runtime = Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(server::serve(&config))?;
        }
        (Some(command), _) => {
            return Err(ApplicationError::Usage(command.to_string()).into());
        }
    }
    Ok(())
}
