use std::process;

fn main() {
    if let Err(error) = luxc_drv::run() {
        eprintln!("error: {:#}", error);
        process::exit(1);
    }
}
