//! Sender CLI: `<server-addr> <server-port> <file-path>`.

use std::path::PathBuf;
use std::process::exit;

use dgram_relay::sender::Sender;

fn print_usage(program: &str) {
    eprintln!("usage: {} <server-addr> <server-port> <file-path>", program);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        print_usage(&args[0]);
        exit(1);
    }

    if dgram_relay::logging::init(None).is_err() {
        eprintln!("could not install logger");
        exit(1);
    }

    let server_addr = &args[1];
    let server_port: u16 = match args[2].parse() {
        Ok(port) => port,
        Err(_) => {
            eprintln!("invalid port: {}", args[2]);
            exit(1);
        }
    };
    let file_path = PathBuf::from(&args[3]);

    let sender = match Sender::connect(server_addr, server_port) {
        Ok(sender) => sender,
        Err(err) => {
            log::error!("could not connect: {}", err);
            exit(1);
        }
    };

    match sender.send_file(&file_path) {
        Ok(sent) => log::info!("sent {} bytes of {}", sent, file_path.display()),
        Err(err) => {
            log::error!("{}", err);
            exit(1);
        }
    }
}
