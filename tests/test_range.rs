use oio_http::Error;
use oio_http::http::range::{ByteRange, ContentRange, decode, encode, parse_content_range};

#[test]
fn test_round_trip_valid_ranges() {
    let sets = vec![
        vec![ByteRange::closed(0, 0)],
        vec![ByteRange::closed(0, 499)],
        vec![ByteRange::from_offset(500)],
        vec![ByteRange::suffix(500)],
        vec![ByteRange::closed(0, 99), ByteRange::closed(200, 299), ByteRange::suffix(1)],
        vec![ByteRange::from_offset(0), ByteRange::closed(7, 7)],
    ];
    for ranges in sets {
        let header = encode(&ranges).unwrap();
        assert_eq!(decode(&header).unwrap(), ranges, "round trip of {header}");
    }
}

#[test]
fn test_encode_validation() {
    assert!(matches!(encode(&[ByteRange::new(None, None)]), Err(Error::InvalidRange(_))));
    assert!(matches!(encode(&[ByteRange::closed(5, 2)]), Err(Error::InvalidRange(_))));
    assert!(matches!(
        encode(&[ByteRange::closed(0, 1), ByteRange::new(Some(3), Some(-4))]),
        Err(Error::InvalidRange(_))
    ));
}

#[test]
fn test_encode_wire_format() {
    let header = encode(&[ByteRange::closed(0, 499), ByteRange::suffix(10), ByteRange::from_offset(600)]).unwrap();
    assert_eq!(header, "bytes=0-499,-10,600-");
}

#[test]
fn test_decode_examples() {
    assert_eq!(decode("bytes=0-499").unwrap(), vec![ByteRange::new(Some(0), Some(499))]);
    assert_eq!(decode("bytes=500-").unwrap(), vec![ByteRange::new(Some(500), None)]);
    assert_eq!(decode("bytes=-500").unwrap(), vec![ByteRange::new(None, Some(500))]);
    assert!(matches!(decode("notbytes=0-1"), Err(Error::InvalidRange(_))));
}

#[test]
fn test_decode_allows_whitespace_around_bounds() {
    assert_eq!(
        decode("bytes=0-499, 500-999").unwrap(),
        vec![ByteRange::closed(0, 499), ByteRange::closed(500, 999)]
    );
    assert_eq!(
        decode("bytes= 0 - 9 ,  -5").unwrap(),
        vec![ByteRange::closed(0, 9), ByteRange::suffix(5)]
    );
    assert!(matches!(decode("bytes=0-1, "), Err(Error::InvalidRange(_))));
    assert!(matches!(decode("bytes=1 0-20"), Err(Error::InvalidRange(_))));
}

#[test]
fn test_decode_rejects_inconsistent_segments() {
    for bad in ["bytes=-", "bytes=9-3", "bytes=0-1,-", "bytes=--1", "bytes=x-1", "bytes="] {
        assert!(matches!(decode(bad), Err(Error::InvalidRange(_))), "{bad} should fail");
    }
}

#[test]
fn test_content_range() {
    assert_eq!(
        parse_content_range("bytes 0-499/1234").unwrap(),
        ContentRange { start: 0, end: 499, total: 1234 }
    );
    for bad in ["bytes 0-499", "0-499/1234", "bytes a-499/1234", "bytes 0-499/1234x", "bytes  0-499/1234"] {
        assert!(matches!(parse_content_range(bad), Err(Error::InvalidContentRange(_))), "{bad} should fail");
    }
}
