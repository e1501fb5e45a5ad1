#![warn(clippy::all)]

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{anyhow, bail, Context, Result};
use bale_core::{
    containers::{CompoundStringBuffer, CompoundTupleBuffer, TupleViewFactory},
    layout::{AllocationMode, ElementKind},
    math::MinMax,
    nalgebra::Vector3,
};
use clap::{value_t, App, Arg};
use log::{info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    /// Every line of the input file is one sub-buffer
    Lines,
    /// Blocks of `x y z` rows separated by blank lines, each block is one sub-buffer
    Polylines,
}

struct Args {
    pub input_file: PathBuf,
    pub mode: Mode,
    pub element_kind: ElementKind,
    pub tuple_size: usize,
    pub allocation_mode: AllocationMode,
    pub subset: Option<Vec<usize>>,
}

fn parse_indices(indices: &str) -> Result<Vec<usize>> {
    indices
        .split(',')
        .map(|index| {
            index
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid sub-buffer index {}", index))
        })
        .collect()
}

fn get_args() -> Result<Args> {
    let matches = App::new("bale info")
        .version("0.1")
        .author("Pascal Bormann <pascal.bormann@igd.fraunhofer.de>")
        .about("Packs a text or vertex file into a compound buffer and prints information about it")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input file")
                .required(true),
        )
        .arg(
            Arg::with_name("MODE")
                .short("m")
                .long("mode")
                .takes_value(true)
                .possible_values(&["lines", "polylines"])
                .default_value("lines")
                .help("Interpret the input as one string per line, or as polylines of whitespace-separated coordinates separated by blank lines"),
        )
        .arg(
            Arg::with_name("KIND")
                .short("k")
                .long("kind")
                .takes_value(true)
                .possible_values(&["i8", "i16", "i32", "f32", "f64"])
                .default_value("f32")
                .help("Element kind that polyline coordinates are stored as"),
        )
        .arg(
            Arg::with_name("TUPLE_SIZE")
                .short("t")
                .long("tuple-size")
                .takes_value(true)
                .default_value("3")
                .help("Number of coordinates per polyline vertex"),
        )
        .arg(
            Arg::with_name("MANAGED")
                .long("managed")
                .help("Use managed instead of direct memory for the polyline buffer"),
        )
        .arg(
            Arg::with_name("SUBSET")
                .short("s")
                .long("subset")
                .takes_value(true)
                .value_name("INDICES")
                .help("Comma-separated sub-buffer indices. Only these sub-buffers are printed, in the given order"),
        )
        .get_matches();

    let input_file = PathBuf::from(
        matches
            .value_of("INPUT")
            .ok_or_else(|| anyhow!("Missing input file"))?,
    );
    let mode = match matches.value_of("MODE") {
        Some("polylines") => Mode::Polylines,
        _ => Mode::Lines,
    };
    let element_kind = matches
        .value_of("KIND")
        .unwrap_or("f32")
        .parse::<ElementKind>()?;
    let tuple_size = value_t!(matches, "TUPLE_SIZE", usize)?;
    let allocation_mode = if matches.is_present("MANAGED") {
        AllocationMode::Managed
    } else {
        AllocationMode::Direct
    };
    let subset = matches.value_of("SUBSET").map(parse_indices).transpose()?;

    Ok(Args {
        input_file,
        mode,
        element_kind,
        tuple_size,
        allocation_mode,
        subset,
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Could not read {}", path.display()))
}

fn pack_lines(lines: &[String]) -> Result<CompoundStringBuffer> {
    let average_length = if lines.is_empty() {
        0
    } else {
        lines.iter().map(|line| line.len()).sum::<usize>() / lines.len()
    };
    let mut buffer = CompoundStringBuffer::new(lines.len(), average_length)?;
    for line in lines {
        buffer.append_sub_buffer(line.as_str())?;
    }
    Ok(buffer)
}

fn pack_polylines(lines: &[String], factory: TupleViewFactory) -> Result<CompoundTupleBuffer> {
    let mut buffer = CompoundTupleBuffer::new(factory, 64, 16)?;
    let mut polyline = factory.new_buffer(0)?;
    for (line_number, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if !polyline.is_empty() {
                buffer.append_sub_buffer(&polyline)?;
                polyline.clear();
            }
            continue;
        }
        let coords = line
            .split_whitespace()
            .map(|value| value.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid coordinate in line {}", line_number + 1))?;
        if coords.len() != factory.tuple_size() {
            warn!(
                "Skipping line {}: expected {} coordinates but found {}",
                line_number + 1,
                factory.tuple_size(),
                coords.len()
            );
            continue;
        }
        polyline
            .push_tuple(&coords)
            .with_context(|| format!("Could not store line {}", line_number + 1))?;
    }
    if !polyline.is_empty() {
        buffer.append_sub_buffer(&polyline)?;
    }
    Ok(buffer)
}

fn print_strings(buffer: &CompoundStringBuffer) -> Result<()> {
    println!("Sub-buffers:          {}", buffer.num_sub_buffers());
    println!("Total size (bytes):   {}", buffer.total_buffer_size());
    for index in 0..buffer.num_sub_buffers() {
        println!("\t{}: {}", index, buffer.sub_str(index)?);
    }
    Ok(())
}

fn bounds_of(buffer: &CompoundTupleBuffer, index: usize) -> Result<Option<(Vector3<f64>, Vector3<f64>)>> {
    if buffer.tuple_size() == 3 && buffer.element_kind() == ElementKind::F64 {
        return Ok(buffer.sub_bounds::<f64>(index)?);
    }
    let range = buffer.sub_range(index)?;
    let bounds = buffer
        .backing_buffer()
        .coords(3)
        .skip(range.start)
        .take(range.len())
        .map(|coords| Vector3::new(coords[0], coords[1], coords[2]))
        .fold(None, |bounds: Option<(Vector3<f64>, Vector3<f64>)>, v| match bounds {
            None => Some((v, v)),
            Some((min, max)) => Some((min.infimum(&v), max.supremum(&v))),
        });
    Ok(bounds)
}

fn print_polylines(buffer: &CompoundTupleBuffer) -> Result<()> {
    println!("Sub-buffers:          {}", buffer.num_sub_buffers());
    println!("Vertices:             {}", buffer.total_buffer_size());
    println!("Element kind:         {}", buffer.element_kind());
    println!(
        "Backing size (bytes): {}",
        buffer.backing_buffer().as_bytes().len()
    );
    if let Some((min, max)) = buffer.backing_buffer().store().extreme_values(None) {
        println!("Value range:          {}  {}", min, max);
    }
    for (index, (first, count)) in buffer.draw_ranges().enumerate() {
        match bounds_of(buffer, index)? {
            Some((min, max)) => println!(
                "\t{}: vertices {}..{}  min ({}, {}, {})  max ({}, {}, {})",
                index,
                first,
                first + count,
                min.x,
                min.y,
                min.z,
                max.x,
                max.y,
                max.z
            ),
            None => println!("\t{}: empty", index),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;
    let t_start = Instant::now();
    let lines = read_lines(&args.input_file)?;
    info!("Read {} lines from {}", lines.len(), args.input_file.display());

    println!("bale info report for {}", args.input_file.display());
    match args.mode {
        Mode::Lines => {
            let buffer = pack_lines(&lines)?;
            match &args.subset {
                Some(indices) => print_strings(&buffer.subset(indices)?)?,
                None => print_strings(&buffer)?,
            }
        }
        Mode::Polylines => {
            if args.tuple_size == 0 {
                bail!("Tuple size must be at least 1");
            }
            if !args.element_kind.is_floating_point() {
                warn!(
                    "Coordinates are stored as {}, fractional parts are truncated",
                    args.element_kind
                );
            }
            let factory = TupleViewFactory::for_kind(args.tuple_size, args.element_kind)
                .with_allocation_mode(args.allocation_mode);
            let buffer = pack_polylines(&lines, factory)?;
            match &args.subset {
                Some(indices) => print_polylines(&buffer.subset(indices)?)?,
                None => print_polylines(&buffer)?,
            }
        }
    }

    info!("Took {:.2}s", t_start.elapsed().as_secs_f64());

    Ok(())
}
