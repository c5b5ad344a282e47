use std::error::Error;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

pub fn read(file: &mut File) -> Result<u64, Box<dyn Error>> {
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    file.seek(SeekFrom::Start(0))?;
    // a shorter write over a regular file leaves a tail behind
    Ok(content
        .split_whitespace()
        .next()
        .ok_or("Device file is empty")?
        .parse()?)
}

pub fn write(file: &mut File, value: u64) -> Result<(), Box<dyn Error>> {
    file.write_all(format!("{value}\n").as_bytes())?;
    file.seek(SeekFrom::Start(0))?;
    Ok(())
}
