mod cli;

use dialtone_core::interrupt;

fn main() {
    if let Err(e) = cli::run() {
        if e.downcast_ref::<interrupt::InterruptedError>().is_some() {
            std::process::exit(interrupt::EXIT_CODE);
        }
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
