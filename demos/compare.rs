use color_eyre::eyre::Result;

use asmvm::{BufferedOutput, Machine};
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init()?; // logging

    let source = r#"
        lod $m, !7
        lod $i, !9
        grt $m, $i
        lst $m, $i
        equ !9, $i
        out %GT
        out %LT
        out %EQ
    "#;

    let mut machine = Machine::new(source, BufferedOutput::new()).with_debug(true);
    machine.run()?;

    for record in machine.output_mut().drain() {
        println!("{}", record);
    }

    Ok(())
}
