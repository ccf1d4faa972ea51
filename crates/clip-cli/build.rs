use std::fs;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

// cli.rs only needs clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let out_dir = Path::new(&out_dir);

    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");
    write_manpages(cli::Cli::command(), &man_dir);

    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir).expect("failed to create completions directory");
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        clap_complete::generate_to(shell, &mut cli::Cli::command(), "clipctl", &completions_dir)
            .unwrap_or_else(|e| panic!("failed to generate {shell} completions: {e}"));
    }
}

/// One page per visible command, named `clipctl-<sub>-<subsub>.1`.
fn write_manpages(root: clap::Command, dir: &Path) {
    let mut pending = vec![root];

    while let Some(cmd) = pending.pop() {
        let name = cmd.get_name().to_owned();

        let mut page = Vec::new();
        clap_mangen::Man::new(cmd.clone())
            .render(&mut page)
            .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
        let path = dir.join(format!("{name}.1"));
        fs::write(&path, page)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

        pending.extend(
            cmd.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| sub.clone().name(format!("{name}-{}", sub.get_name()))),
        );
    }
}
