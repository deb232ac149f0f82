use super::cli::OutputFormat;
use super::error::CliError;
use espfit::math::constants::BOHR_TO_ANGSTROM;
use espfit::types::element_to_atomic_number;
use espfit::{Atom, FilterStats, Molecule, QpSolution, RawLattice, ValidationReport};
use prettytable::*;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reads an XYZ geometry file, converting angstrom coordinates to Bohr.
///
/// Returns the molecule plus the file's comment line (echoed into some
/// output formats).
pub fn read_xyz(path: &Path) -> Result<(Molecule, String), CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let path_str = path.display().to_string();

    let mut lines = reader.lines();

    let num_atoms_line = lines.next().ok_or_else(|| CliError::XyzParse {
        path: path_str.clone(),
        details: "Missing number of atoms line".to_string(),
    })??;
    let num_atoms: usize = num_atoms_line
        .trim()
        .parse()
        .map_err(|_| CliError::XyzParse {
            path: path_str.clone(),
            details: format!("Invalid number of atoms: {}", num_atoms_line),
        })?;

    let comment = lines.next().ok_or_else(|| CliError::XyzParse {
        path: path_str.clone(),
        details: "Missing comment line".to_string(),
    })??;

    let mut molecule = Molecule::new();
    for (i, line) in lines.enumerate() {
        if i >= num_atoms {
            break;
        }
        let line = line.map_err(|e| CliError::XyzParse {
            path: path_str.clone(),
            details: format!("Error reading line {}: {}", i + 3, e),
        })?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(CliError::XyzParse {
                path: path_str.clone(),
                details: format!(
                    "Line {}: expected at least 4 fields, got {}",
                    i + 3,
                    parts.len()
                ),
            });
        }

        let element = parts[0];
        if element_to_atomic_number(element).is_none() {
            warn!(element, "unrecognized element symbol; atom kept, atomic number unknown");
        }

        let mut position = [0.0_f64; 3];
        for (d, field) in parts[1..4].iter().enumerate() {
            let coord: f64 = field.parse().map_err(|_| CliError::XyzParse {
                path: path_str.clone(),
                details: format!("Invalid coordinate on line {}: {}", i + 3, field),
            })?;
            // Angstrom on disk, Bohr in memory.
            position[d] = coord / BOHR_TO_ANGSTROM;
        }

        molecule.add_atom(Atom::new(element, position));
    }

    if molecule.num_atoms() != num_atoms {
        return Err(CliError::XyzParse {
            path: path_str,
            details: format!(
                "Expected {} atoms, got {}",
                num_atoms,
                molecule.num_atoms()
            ),
        });
    }

    Ok((molecule, comment))
}

/// Reads a Gaussian cube file into a raw lattice, applying no unit
/// conversion: origin, axes, and values are consumed as atomic units.
///
/// Returns the lattice plus the number of atom records the cube carried,
/// for cross-checking against the XYZ geometry.
pub fn read_cube(path: &Path) -> Result<(RawLattice, usize), CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let path_str = path.display().to_string();
    let parse_err = |details: String| CliError::CubeParse {
        path: path_str.clone(),
        details,
    };

    let mut lines = content.lines();

    // Two comment lines.
    for _ in 0..2 {
        lines
            .next()
            .ok_or_else(|| parse_err("Missing comment line".to_string()))?;
    }

    // Atom count and origin.
    let header = lines
        .next()
        .ok_or_else(|| parse_err("Missing atom-count/origin line".to_string()))?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(parse_err(format!("Malformed header line: {}", header)));
    }
    let num_atoms: i64 = fields[0]
        .parse()
        .map_err(|_| parse_err(format!("Invalid atom count: {}", fields[0])))?;
    let mut origin = [0.0_f64; 3];
    for d in 0..3 {
        origin[d] = fields[d + 1]
            .parse()
            .map_err(|_| parse_err(format!("Invalid origin component: {}", fields[d + 1])))?;
    }

    // Three axis lines: point count plus step vector.
    let mut counts = [0usize; 3];
    let mut axes = [[0.0_f64; 3]; 3];
    for axis in 0..3 {
        let line = lines
            .next()
            .ok_or_else(|| parse_err(format!("Missing axis line {}", axis + 1)))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(parse_err(format!("Malformed axis line: {}", line)));
        }
        let count: i64 = fields[0]
            .parse()
            .map_err(|_| parse_err(format!("Invalid axis count: {}", fields[0])))?;
        counts[axis] = count.unsigned_abs() as usize;
        for d in 0..3 {
            axes[axis][d] = fields[d + 1]
                .parse()
                .map_err(|_| parse_err(format!("Invalid axis component: {}", fields[d + 1])))?;
        }
    }

    // Atom records; only consumed to advance the reader. A negative atom
    // count is the cube convention for files with an extra data-set header.
    let atom_records = num_atoms.unsigned_abs() as usize;
    for i in 0..atom_records {
        lines
            .next()
            .ok_or_else(|| parse_err(format!("Missing atom record {}", i + 1)))?;
    }

    // Everything else is the flat value stream.
    let mut values = Vec::new();
    for line in lines {
        for field in line.split_whitespace() {
            let value: f64 = field
                .parse()
                .map_err(|_| parse_err(format!("Invalid potential value: {}", field)))?;
            values.push(value);
        }
    }

    let lattice = RawLattice {
        origin,
        axes,
        counts,
        values,
    };

    let expected = lattice.num_expected();
    if lattice.values.len() != expected {
        warn!(
            read = lattice.values.len(),
            expected,
            "cube value count does not match lattice extent; using the shorter of the two"
        );
    }

    Ok((lattice, atom_records))
}

pub fn get_writer(output_path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn write_results(
    mut writer: Box<dyn Write>,
    molecule: &Molecule,
    solution: &QpSolution,
    report: &ValidationReport,
    stats: &FilterStats,
    comment: &str,
    format: &OutputFormat,
    precision: usize,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Pretty => {
            write_pretty_tables(&mut writer, molecule, solution, report, stats, precision)
        }
        OutputFormat::Xyz => write_xyz_charged(&mut writer, molecule, solution, comment, precision),
        OutputFormat::Csv => write_csv(&mut writer, molecule, precision),
        OutputFormat::Json => write_json(&mut writer, molecule, solution, report, precision),
    }
}

fn write_pretty_tables(
    writer: &mut dyn Write,
    molecule: &Molecule,
    solution: &QpSolution,
    report: &ValidationReport,
    stats: &FilterStats,
    precision: usize,
) -> Result<(), CliError> {
    let box_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Intern],
            format::LineSeparator::new('─', '┼', '├', '┤'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let no_intern_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let mut title_table = Table::new();
    title_table.set_format(box_format);
    title_table.add_row(row![bc->"espfit — ESP Charge Fitting Results"]);
    title_table.print(writer)?;
    writeln!(writer)?;

    let mut summary_table = Table::new();
    summary_table.set_format(no_intern_format);
    summary_table.add_row(row![b->"Total Atoms:", molecule.num_atoms()]);
    summary_table.add_row(row![b->"Grid Points Used:", stats.accepted]);
    summary_table.add_row(row![
        b->"Filtered (near nucleus):",
        stats.near_nucleus
    ]);
    summary_table.add_row(row![
        b->"Filtered (extreme value):",
        stats.extreme_value
    ]);
    summary_table.add_row(row![
        b->"Sign Convention Flipped:",
        if stats.sign_flipped { "Yes" } else { "No" }
    ]);
    summary_table.add_row(row![
        b->"Converged:",
        if solution.converged { "Yes" } else { "No" }
    ]);
    summary_table.add_row(row![b->"Iterations:", solution.iterations]);
    summary_table.add_row(row![
        b->"Objective Value:",
        format!("{:.prec$e}", solution.objective_value, prec = precision)
    ]);
    summary_table.add_row(row![
        b->"Total Charge:",
        format!("{:.prec$} e", report.total_charge, prec = precision)
    ]);
    summary_table.add_row(row![
        b->"ESP RMSE:",
        format!("{:.prec$} a.u.", report.esp_rmse, prec = precision)
    ]);
    summary_table.add_row(row![
        b->"ESP Max Error:",
        format!("{:.prec$} a.u.", report.esp_max_error, prec = precision)
    ]);
    summary_table.add_row(row![
        b->"Dipole Moment:",
        format!("{:.prec$} D", report.dipole_moment, prec = precision)
    ]);
    summary_table.add_row(row![b->"Fit Quality:", report.quality()]);
    summary_table.print(writer)?;
    writeln!(writer)?;

    let mut data_table = Table::new();
    data_table.set_format(box_format);
    data_table.set_titles(
        row![bc->"Index", bc->"Element", bc->"X (Å)", bc->"Y (Å)", bc->"Z (Å)", bc->"Charge (e)"],
    );

    for atom in molecule.atoms() {
        data_table.add_row(row![
            r->atom.index,
            l->atom.element,
            r->format!("{:.prec$}", atom.position[0] * BOHR_TO_ANGSTROM, prec = precision),
            r->format!("{:.prec$}", atom.position[1] * BOHR_TO_ANGSTROM, prec = precision),
            r->format!("{:.prec$}", atom.position[2] * BOHR_TO_ANGSTROM, prec = precision),
            r->format!("{:+.prec$}", atom.charge, prec = precision)
        ]);
    }

    data_table.print(writer)?;

    Ok(())
}

fn write_xyz_charged(
    writer: &mut dyn Write,
    molecule: &Molecule,
    solution: &QpSolution,
    comment: &str,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "{}", molecule.num_atoms())?;
    writeln!(
        writer,
        "{} | ESP-fitted charges | converged: {} | objective: {:.*e}",
        comment.trim(),
        solution.converged,
        precision,
        solution.objective_value
    )?;
    for atom in molecule.atoms() {
        writeln!(
            writer,
            "{} {:.*} {:.*} {:.*} {:.*}",
            atom.element,
            precision,
            atom.position[0] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[1] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[2] * BOHR_TO_ANGSTROM,
            precision,
            atom.charge
        )?;
    }
    Ok(())
}

fn write_csv(
    writer: &mut dyn Write,
    molecule: &Molecule,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "index,element,x,y,z,charge")?;
    for atom in molecule.atoms() {
        writeln!(
            writer,
            "{},{},{:.*},{:.*},{:.*},{:.*}",
            atom.index,
            atom.element,
            precision,
            atom.position[0] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[1] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[2] * BOHR_TO_ANGSTROM,
            precision,
            atom.charge
        )?;
    }
    Ok(())
}

fn write_json(
    writer: &mut dyn Write,
    molecule: &Molecule,
    solution: &QpSolution,
    report: &ValidationReport,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"atoms\": [")?;
    let n = molecule.num_atoms();
    for atom in molecule.atoms() {
        let comma = if atom.index < n - 1 { "," } else { "" };
        writeln!(writer, "    {{")?;
        writeln!(writer, "      \"index\": {},", atom.index)?;
        writeln!(writer, "      \"element\": \"{}\",", atom.element)?;
        writeln!(
            writer,
            "      \"position_angstrom\": [{:.*}, {:.*}, {:.*}],",
            precision,
            atom.position[0] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[1] * BOHR_TO_ANGSTROM,
            precision,
            atom.position[2] * BOHR_TO_ANGSTROM
        )?;
        writeln!(writer, "      \"charge\": {:.*}", precision, atom.charge)?;
        writeln!(writer, "    }}{}", comma)?;
    }
    writeln!(writer, "  ],")?;
    writeln!(
        writer,
        "  \"total_charge\": {:.*},",
        precision, report.total_charge
    )?;
    writeln!(writer, "  \"converged\": {},", solution.converged)?;
    writeln!(writer, "  \"iterations\": {},", solution.iterations)?;
    writeln!(
        writer,
        "  \"objective_value\": {:.*e},",
        precision, solution.objective_value
    )?;
    writeln!(writer, "  \"esp_rmse\": {:.*},", precision, report.esp_rmse)?;
    writeln!(
        writer,
        "  \"esp_max_error\": {:.*},",
        precision, report.esp_max_error
    )?;
    writeln!(
        writer,
        "  \"dipole_moment_debye\": {:.*},",
        precision, report.dipole_moment
    )?;
    writeln!(writer, "  \"quality\": \"{}\"", report.quality())?;
    writeln!(writer, "}}")?;
    Ok(())
}
