use crate::error::Result;
use repochunk_chunker::ChunkRecord;
use std::io::Write;

/// Write records as one pretty-printed JSON array
pub fn write_json<W: Write>(records: &[ChunkRecord], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Stream records as JSON Lines without collecting them first.
///
/// Returns the number of records written.
pub fn write_jsonl<W, I>(records: I, mut writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = ChunkRecord>,
{
    let mut written = 0;
    for record in records {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
