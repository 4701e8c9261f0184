use std::process::ExitCode;

fn main() -> ExitCode {
    lootshelf_cli::run()
}
