//! Directory-listing replies end to end: pack stats through
//! `DirListingWriter`, wrap them in a read reply, parse it back, and
//! recover every record bit for bit.

use ninewire::message::{DirMode, Qid, QidType, Stat};
use ninewire::{Decoder, DirListingWriter, Encoder, Parser, Response, ResponseBuilder};
use proptest::prelude::*;

fn root_stat() -> Stat<'static> {
    Stat::new(
        1,
        2,
        Qid {
            typ: QidType::DIR,
            version: 0,
            path: 64,
        },
        DirMode::from_bits_retain(0o1000644),
        0,
        0,
        4096,
        "Root",
        "User",
        "Glanda",
        "User",
    )
}

fn numbered_stat(index: u64, name: &str) -> Stat<'_> {
    Stat::new(
        0,
        0,
        Qid {
            typ: QidType::FILE,
            version: 1,
            path: index,
        },
        DirMode::READ | DirMode::WRITE,
        100,
        200,
        index * 512,
        name,
        "glenda",
        "sys",
        "glenda",
    )
}

#[test]
fn read_reply_carries_one_packed_stat() {
    let stat = root_stat();

    // Pack the listing into a scratch region first, then wrap it in a
    // read reply the way a server answers a directory read.
    let mut listing = [0_u8; 4096];
    let mut encoder = Encoder::new(&mut listing);
    let mut writer = DirListingWriter::new(&mut encoder, 4096, 0);
    assert_eq!(writer.encode(&stat), Ok(true));
    let packed = u32::from(DirListingWriter::size_stat(&stat));
    assert_eq!(writer.bytes_encoded(), packed);

    let mut reply = [0_u8; 4096];
    let mut builder = ResponseBuilder::with_tag(&mut reply, 1);
    builder
        .read(&listing[..packed as usize])
        .expect("reply should fit");

    let parser = Parser::default();
    let mut decoder = Decoder::new(builder.bytes());
    let header = parser.parse_header(&mut decoder).expect("header is valid");
    let Response::Read { data } = parser
        .parse_response(&header, &mut decoder)
        .expect("reply is valid")
    else {
        panic!("expected a read reply");
    };
    assert_eq!(data.len(), packed as usize);

    let mut stats = Decoder::new(data);
    let recovered = stats.read_stat().expect("stat should decode");
    assert_eq!(recovered, stat);
    assert_eq!(stats.remaining(), 0);
}

#[test]
fn second_page_continues_where_the_first_stopped() {
    let names = ["alpha", "beta", "gamma", "delta"];
    let stats: Vec<Stat<'_>> = names
        .iter()
        .enumerate()
        .map(|(index, name)| numbered_stat(index as u64, name))
        .collect();
    let sizes: Vec<u64> = stats
        .iter()
        .map(|stat| u64::from(DirListingWriter::size_stat(stat)))
        .collect();

    // First page: room for exactly two records.
    let window = u32::try_from(sizes[0] + sizes[1]).expect("fits");
    let mut page = [0_u8; 1024];
    let mut encoder = Encoder::new(&mut page);
    let mut writer = DirListingWriter::new(&mut encoder, window, 0);
    for stat in &stats {
        if !writer.encode(stat).expect("page should fit") {
            break;
        }
    }
    assert_eq!(u64::from(writer.bytes_encoded()), sizes[0] + sizes[1]);

    // Second page: the client advances its offset past the first page.
    let offset = sizes[0] + sizes[1];
    let mut encoder = Encoder::new(&mut page);
    let mut writer = DirListingWriter::new(&mut encoder, 1024, offset);
    for stat in &stats {
        if !writer.encode(stat).expect("page should fit") {
            break;
        }
    }
    assert_eq!(u64::from(writer.bytes_encoded()), sizes[2] + sizes[3]);

    let written = writer.bytes_encoded() as usize;
    let mut decoder = Decoder::new(&page[..written]);
    let third = decoder.read_stat().expect("stat should decode");
    let fourth = decoder.read_stat().expect("stat should decode");
    assert_eq!(third.name, "gamma");
    assert_eq!(fourth.name, "delta");
    assert_eq!(decoder.remaining(), 0);
}

proptest! {
    /// Whatever the window, the writer emits exactly the records whose
    /// span lies inside it, never more than `count` bytes, and the
    /// emitted bytes decode back to those records.
    #[test]
    fn any_window_emits_exactly_the_records_inside_it(
        name_lens in proptest::collection::vec(1_usize..24, 1..12),
        offset_records in 0_usize..12,
        count in 0_u32..2048,
    ) {
        let names: Vec<String> = name_lens
            .iter()
            .enumerate()
            .map(|(index, len)| format!("{index:03}").repeat(1 + len / 3))
            .collect();
        let stats: Vec<Stat<'_>> = names
            .iter()
            .enumerate()
            .map(|(index, name)| numbered_stat(index as u64, name))
            .collect();
        let sizes: Vec<u64> = stats
            .iter()
            .map(|stat| u64::from(DirListingWriter::size_stat(stat)))
            .collect();

        // Offsets land on record boundaries, as 9P clients produce them.
        let offset: u64 = sizes
            .iter()
            .take(offset_records.min(sizes.len()))
            .sum();

        let mut page = vec![0_u8; 4096];
        let mut encoder = Encoder::new(&mut page);
        let mut writer = DirListingWriter::new(&mut encoder, count, offset);
        for stat in &stats {
            if !writer.encode(stat).expect("page is large enough") {
                break;
            }
        }
        let encoded = writer.bytes_encoded();
        prop_assert!(u64::from(encoded) <= u64::from(count));

        // Reproduce the expectation independently.
        let mut expected = Vec::new();
        let mut traversed = 0_u64;
        let mut used = 0_u64;
        for (stat, size) in stats.iter().zip(&sizes) {
            if traversed + size <= offset {
                traversed += size;
                continue;
            }
            if used + size > u64::from(count) {
                break;
            }
            traversed += size;
            used += size;
            expected.push(*stat);
        }
        prop_assert_eq!(u64::from(encoded), used);

        let mut decoder = Decoder::new(&page[..encoded as usize]);
        for stat in &expected {
            let recovered = decoder.read_stat().expect("record should decode");
            prop_assert_eq!(&recovered, stat);
        }
        prop_assert_eq!(decoder.remaining(), 0);
    }
}
