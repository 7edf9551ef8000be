use std::process;

fn main() {
    if let Err(err) = agent_session_export::cli::run() {
        eprintln!("{err}");
        process::exit(1);
    }
}
