use clap::{arg, crate_version, Command};
use huffcodec::{canonical, traditional, Error};
use std::fs::File;
use std::io::{stdout, BufWriter, Read, Write};

const RCH: &str = "unreachable was reached";

fn dispatch(
    variant: &str,
    action: &str,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> std::result::Result<(), Error> {
    match (variant, action) {
        ("traditional", "encode") => traditional::encode(input, output),
        ("traditional", "decode") => traditional::decode(input, output),
        ("traditional", "show-tree") => traditional::show_tree(input, output),
        ("canonical", "encode") => canonical::encode(input, output),
        ("canonical", "decode") => canonical::decode(input, output),
        ("canonical", "show-tree") => canonical::show_tree(input, output),
        _ => unreachable!("{RCH}"),
    }
}

fn run(cmd: &clap::ArgMatches, action: &str) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let path_in = cmd.get_one::<String>("input").expect(RCH);
    let variant = cmd.get_one::<String>("variant").expect(RCH);
    let mut input = File::open(path_in)?;
    log::debug!("{action} ({variant}) from {path_in}");
    match cmd.get_one::<String>("output") {
        Some(path_out) => {
            let mut output = BufWriter::new(File::create(path_out)?);
            dispatch(variant, action, &mut input, &mut output)?;
            output.flush()?;
        }
        None => {
            let mut output = stdout().lock();
            dispatch(variant, action, &mut input, &mut output)?;
        }
    }
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:   `huffcodec encode --variant canonical -i my_file -o my_file.hc`
Expand:     `huffcodec decode --variant canonical -i my_file.hc -o my_file`
Inspect:    `huffcodec show-tree --variant traditional -i my_file`";

    let variants = ["traditional", "canonical"];

    let io_args = |cmd: Command| -> Command {
        cmd.arg(
            arg!(-v --variant <VARIANT> "codec variant")
                .value_parser(variants)
                .required(true),
        )
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path (defaults to stdout)").required(false))
    };

    let main_cmd = Command::new("huffcodec")
        .about("Lossless Huffman coding, traditional and canonical variants")
        .after_long_help(long_help)
        .version(crate_version!())
        .subcommand(io_args(Command::new("encode")).about("compress a file"))
        .subcommand(io_args(Command::new("decode")).about("expand a file"))
        .subcommand(io_args(Command::new("show-tree")).about("dump the code table for a file"));

    let matches = main_cmd.get_matches();

    let result = if let Some(cmd) = matches.subcommand_matches("encode") {
        run(cmd, "encode")
    } else if let Some(cmd) = matches.subcommand_matches("decode") {
        run(cmd, "decode")
    } else if let Some(cmd) = matches.subcommand_matches("show-tree") {
        run(cmd, "show-tree")
    } else {
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }

    Ok(())
}
