use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs is included directly so the command tree is available at build
// time; it deliberately depends on nothing beyond clap + clap_complete,
// both of which are build-dependencies as well.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("cannot create man/ under OUT_DIR");

    write_manpages(&cli::Cli::command(), &man_dir);
}

/// Write a man page for `cmd` and each visible subcommand, recursively.
///
/// Subcommand pages are named `uprotect-<sub>.1` the way man expects.
fn write_manpages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("man page render for `{name}`: {e}"));
    fs::write(dir.join(format!("{name}.1")), page)
        .unwrap_or_else(|e| panic!("man page write for `{name}`: {e}"));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let qualified = format!("{name}-{}", sub.get_name());
        write_manpages(&sub.clone().name(qualified), dir);
    }
}
