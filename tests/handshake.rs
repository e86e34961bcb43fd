//! End-to-end exchanges driven byte by byte: version negotiation, opens,
//! walks, and a truncated frame, exactly as they appear on the wire.

use ninewire::message::OpenMode;
use ninewire::{
    Decoder,
    MAX_MESSAGE_SIZE,
    NO_TAG,
    NineError,
    PROTOCOL_VERSION,
    Parser,
    Request,
    RequestBuilder,
    Response,
    ResponseBuilder,
};

#[test]
fn version_handshake_frame_is_byte_exact() {
    let mut buf = [0_u8; 64];
    let mut builder = RequestBuilder::new(&mut buf);
    let len = builder
        .version(MAX_MESSAGE_SIZE, PROTOCOL_VERSION)
        .expect("version should fit");

    // size[4] type[1] tag[2] msize[4] version[2 + 8]
    assert_eq!(len, 21);
    let bytes = builder.bytes();
    assert_eq!(&bytes[..4], &[0x15, 0x00, 0x00, 0x00]);
    assert_eq!(bytes[4], 100);
    assert_eq!(&bytes[5..7], &[0xFF, 0xFF]);

    let parser = Parser::default();
    let mut decoder = Decoder::new(bytes);
    let header = parser.parse_header(&mut decoder).expect("header is valid");
    assert_eq!(header.tag, NO_TAG);
    let request = parser
        .parse_request(&header, &mut decoder)
        .expect("request is valid");
    assert_eq!(
        request,
        Request::Version {
            msize: 8192,
            version: "9P2000.e"
        }
    );
}

#[test]
fn both_sides_settle_on_the_servers_answer() {
    let mut client = Parser::default();
    let mut server = Parser::new(ninewire::ParserConfig {
        max_message_size: 4096,
        version: "9P2000".to_owned(),
    });

    // Client offers its maximum.
    let mut wire = [0_u8; 128];
    let mut builder = RequestBuilder::new(&mut wire);
    builder
        .version(client.max_possible_message_size(), client.offered_version())
        .expect("offer should fit");

    let mut decoder = Decoder::new(builder.bytes());
    let header = server.parse_header(&mut decoder).expect("header is valid");
    let Request::Version { msize, version } = server
        .parse_request(&header, &mut decoder)
        .expect("offer is valid")
    else {
        panic!("expected a version request");
    };
    assert_eq!((msize, version), (8192, "9P2000.e"));

    // Server downgrades to what it can do.
    let granted_size = server.set_negotiated_message_size(msize);
    let granted_version = server.offered_version().to_owned();
    server.set_negotiated_version(granted_version.clone());
    assert_eq!(granted_size, 4096);

    let mut wire = [0_u8; 128];
    let mut builder = ResponseBuilder::new(&mut wire);
    builder
        .version(granted_size, &granted_version)
        .expect("answer should fit");

    // Client adopts the server's answer.
    let mut decoder = Decoder::new(builder.bytes());
    let header = client.parse_header(&mut decoder).expect("header is valid");
    let Response::Version { msize, version } = client
        .parse_response(&header, &mut decoder)
        .expect("answer is valid")
    else {
        panic!("expected a version response");
    };
    client.set_negotiated_message_size(msize);
    client.set_negotiated_version(version);

    assert_eq!(client.negotiated_message_size(), 4096);
    assert_eq!(client.negotiated_version(), "9P2000");
    assert_eq!(client.offered_version(), PROTOCOL_VERSION);
}

#[test]
fn open_request_occupies_twelve_bytes() {
    let mut buf = [0_u8; 16];
    let mut builder = RequestBuilder::with_tag(&mut buf, 1);
    let len = builder.open(42, OpenMode::READ).expect("open should fit");
    assert_eq!(len, 12);

    let parser = Parser::default();
    let mut decoder = Decoder::new(builder.bytes());
    let header = parser.parse_header(&mut decoder).expect("header is valid");
    let request = parser
        .parse_request(&header, &mut decoder)
        .expect("request is valid");
    assert_eq!(
        request,
        Request::Open {
            fid: 42,
            mode: OpenMode::READ
        }
    );
}

#[test]
fn walk_with_no_elements_is_header_plus_ten_bytes() {
    let mut buf = [0_u8; 32];
    let mut builder = RequestBuilder::with_tag(&mut buf, 1);
    let len = builder.walk(1, 2, &[]).expect("walk should fit");
    // fid[4] newfid[4] count[2] after the 7-byte header.
    assert_eq!(len, 17);

    let parser = Parser::default();
    let mut decoder = Decoder::new(builder.bytes());
    let header = parser.parse_header(&mut decoder).expect("header is valid");
    let Request::Walk { fid, newfid, path } = parser
        .parse_request(&header, &mut decoder)
        .expect("request is valid")
    else {
        panic!("expected a walk");
    };
    assert_eq!((fid, newfid), (1, 2));
    assert!(path.is_empty());
}

#[test]
fn walk_elements_come_back_as_views_into_the_frame() {
    let mut buf = [0_u8; 64];
    let mut builder = RequestBuilder::with_tag(&mut buf, 1);
    builder
        .walk(1, 2, &["usr", "local", "bin"])
        .expect("walk should fit");

    let parser = Parser::default();
    let frame = builder.bytes();
    let mut decoder = Decoder::new(frame);
    let header = parser.parse_header(&mut decoder).expect("header is valid");
    let Request::Walk { path, .. } = parser
        .parse_request(&header, &mut decoder)
        .expect("request is valid")
    else {
        panic!("expected a walk");
    };

    let elements: Vec<&str> = path.iter().collect();
    assert_eq!(elements.iter().map(|e| e.len()).collect::<Vec<_>>(), [3, 5, 3]);
    assert_eq!(elements.concat(), "usrlocalbin");
    for element in &elements {
        let start = frame.as_ptr() as usize;
        let end = start + frame.len();
        let p = element.as_ptr() as usize;
        assert!(p >= start && p + element.len() <= end, "element must borrow from the frame");
    }
}

#[test]
fn a_truncated_frame_fails_at_the_payload_not_the_header() {
    let mut buf = [0_u8; 16];
    let mut builder = RequestBuilder::with_tag(&mut buf, 1);
    let len = builder.open(42, OpenMode::READ).expect("open should fit");
    let truncated = &builder.bytes()[..len - 1];

    let parser = Parser::default();
    let mut decoder = Decoder::new(truncated);
    let header = parser
        .parse_header(&mut decoder)
        .expect("seven header bytes are intact");
    assert_eq!(
        parser.parse_request(&header, &mut decoder),
        Err(NineError::NotEnoughData)
    );
}
