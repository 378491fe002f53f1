//! Receiver CLI: `<bind-addr> <port> <dest-dir> [log-file]`.

use std::path::{Path, PathBuf};
use std::process::exit;

use dgram_relay::receiver::Receiver;

fn print_usage(program: &str) {
    eprintln!("usage: {} <bind-addr> <port> <dest-dir> [log-file]", program);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        print_usage(&args[0]);
        exit(1);
    }

    let bind_addr = &args[1];
    let port: u16 = match args[2].parse() {
        Ok(port) => port,
        Err(_) => {
            eprintln!("invalid port: {}", args[2]);
            exit(1);
        }
    };
    let dest_dir = PathBuf::from(&args[3]);
    let log_file: Option<PathBuf> = args.get(4).map(PathBuf::from);

    if let Err(err) = dgram_relay::logging::init(log_file.as_deref().map(Path::new)) {
        eprintln!("could not install logger: {}", err);
        exit(1);
    }

    let mut receiver = match Receiver::bind(bind_addr, port, &dest_dir) {
        Ok(receiver) => receiver,
        Err(err) => {
            log::error!("could not start: {}", err);
            exit(1);
        }
    };

    log::info!("listening on {}:{}, saving into {}", bind_addr, port, dest_dir.display());
    if let Err(err) = receiver.run() {
        log::error!("{}", err);
        exit(1);
    }
}
