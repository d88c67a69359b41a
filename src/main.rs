use std::process::exit;

fn main() {
    if let Err(e) = selodir::app::run_cli() {
        eprintln!("selodir: {e}");
        exit(1);
    }
}
