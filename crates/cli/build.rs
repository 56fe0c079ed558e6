use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("mindvault")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract readable article text from saved pages")
        .arg(clap::arg!(<INPUT> "Local HTML file, or '-' for stdin"))
        .arg(clap::arg!(-u --url <URL> "Address the page was fetched from (default: the file's path)").value_name("URL"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (html, text, json)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["html", "text", "json"]),
        )
        .arg(
            clap::arg!(--min_score <SCORE> "Top candidate score below which the whole body is used")
                .default_value("20"),
        )
        .arg(clap::arg!(--max_elements <NUM> "Maximum number of top candidates to track").default_value("5"))
        .arg(clap::arg!(--no_images "Strip images from output"))
        .arg(clap::arg!(--keep_classes "Keep class attributes in output HTML"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "mindvault", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "mindvault", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "mindvault", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "mindvault", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
