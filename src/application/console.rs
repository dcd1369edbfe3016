//! Interactive mode
use std::io::{self, BufRead, Write};

use log::{debug, info};

use crate::evaluate;

const EXIT_COMMAND: &str = "exit";

/// Read one expression per line from `input` and report each outcome to
/// `output`, until `exit` or end of input.
pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    loop {
        show_prompt(&mut output)?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            break;
        }
        let expression = line.trim();
        if expression == EXIT_COMMAND {
            break;
        }
        match evaluate(expression) {
            Ok(result) => writeln!(output, "{expression} = {result}")?,
            Err(e) => writeln!(output, "{expression} calculation failed with error: {e}")?,
        }
    }
    info!("application was successfully closed");
    Ok(())
}

fn show_prompt(output: &mut impl Write) -> io::Result<()> {
    write!(output, "input expression: ")?;
    output.flush()
}
