#![no_main]
use libfuzzer_sys::fuzz_target;
use spaten::{SpatenDeframer, SpatenReader, MAGIC, VERSION};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Raw input, header included.
    if let Ok(mut reader) = SpatenReader::new(Cursor::new(data), SpatenDeframer) {
        let _ = reader.process_all(|_| Ok(()));
    }

    // Behind a valid header, so the block layer is always reached.
    let mut stream = MAGIC.to_vec();
    stream.extend_from_slice(&VERSION.to_le_bytes());
    stream.extend_from_slice(data);
    if let Ok(reader) = SpatenReader::new(Cursor::new(stream), SpatenDeframer) {
        for feature in reader {
            if feature.is_err() {
                break;
            }
        }
    }
});
