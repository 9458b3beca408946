//! Start a TrackIR session, print what the library reports, and stop.

fn main() {
    env_logger::init();

    let config = trackir::Config::from_env();
    match trackir::Client::open_from_config(&config) {
        Ok(mut client) => {
            println!("DLL signature: {}", client.signature().dll);
            println!("App signature: {}", client.signature().app);
            match client.version() {
                Some(v) => {
                    let (major, minor) = trackir::protocol::split_version(v);
                    println!("Version:       {}.{:02}", major, minor);
                }
                None => println!("Version:       unknown"),
            }
            match client.get_data() {
                Ok(sample) => println!("Sample:        {:?}", sample.pose()),
                Err(e) => eprintln!("Poll failed: {}", e),
            }
            if let Err(e) = client.stop() {
                eprintln!("Stop failed: {}", e);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
