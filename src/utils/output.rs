use std::{ fs::File, io::{ Error, Write } };

/// Writes the contents of a 2D vector to a file.
///
/// # Arguments
///
/// * `file_name` - A reference to a string representing the name of the file.
/// * `data` - A reference to a 2D vector containing data to be written to the file.
///
/// # Returns
///
/// * `Result<(), Error>` - Returns `Ok(())` if successful, or an `Error` if an error occurs.
///
pub fn output_file_from_2dvec<T: std::fmt::Display>(
    file_name: &str,
    data: &[Vec<T>]
) -> Result<(), Error> {
    let mut output = File::create(file_name)?;

    for d in data {
        let row: Vec<String> = d.iter().map(|v| v.to_string()).collect();
        writeln!(output, "{}", row.join(" "))?;
    }

    Ok(())
}
