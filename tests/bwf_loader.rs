use std::fs;
use std::path::Path;

use bwf2pbcore::{bwf, ohms, pbcore};
use xmltree::Element;

const XMP_PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
      xmlns:dc="http://purl.org/dc/elements/1.1/"
      xmlns:autoBWF="http://ns.autobwf.org/1.0/">
   <dc:description>
    <rdf:Alt>
     <rdf:li xml:lang="x-default">Second of three sessions.</rdf:li>
    </rdf:Alt>
   </dc:description>
   <autoBWF:form>oral history</autoBWF:form>
   <autoBWF:FileContent>smith_interview_01</autoBWF:FileContent>
   <autoBWF:topics>coal mining; unions {Q49371}</autoBWF:topics>
   <autoBWF:interviewer>Pat Jones</autoBWF:interviewer>
   <autoBWF:interviewee>Jane Smith {Q100}</autoBWF:interviewee>
   <autoBWF:owner>State Historical Society</autoBWF:owner>
   <autoBWF:language>en - US</autoBWF:language>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

fn push_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

/// One second of silent 16-bit stereo 44.1 kHz audio with bext, LIST-INFO
/// and an XMP packet — the smallest file the loader considers complete.
fn synthetic_bwf() -> Vec<u8> {
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&2u16.to_le_bytes()); // channels
    fmt.extend_from_slice(&44_100u32.to_le_bytes());
    fmt.extend_from_slice(&176_400u32.to_le_bytes()); // byte rate
    fmt.extend_from_slice(&4u16.to_le_bytes()); // block align
    fmt.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    let mut bext = vec![0u8; 602];
    bext[0..25].copy_from_slice(b"Oral history field master");
    bext[256..263].copy_from_slice(b"autoBWF");
    bext[288..303].copy_from_slice(b"USSHSJS20190502");
    bext[320..330].copy_from_slice(b"2019-05-02");
    bext[330..338].copy_from_slice(b"10:30:00");
    bext.extend_from_slice(b"A=PCM,F=44100,W=16,M=stereo");

    let mut info = Vec::new();
    info.extend_from_slice(b"INFO");
    for (key, value) in [
        (b"INAM", "Interview with Jane Smith".as_bytes()),
        (b"ICRD", "2019-05-02".as_bytes()),
        (b"ICOP", "(c) 2019 State Historical Society".as_bytes()),
        (b"ISRC", "Smith Family Collection".as_bytes()),
    ] {
        info.extend_from_slice(key);
        info.extend_from_slice(&(value.len() as u32).to_le_bytes());
        info.extend_from_slice(value);
        if value.len() % 2 == 1 {
            info.push(0);
        }
    }

    let mut file = Vec::new();
    file.extend_from_slice(b"RIFF");
    file.extend_from_slice(&0u32.to_le_bytes()); // patched below
    file.extend_from_slice(b"WAVE");
    push_chunk(&mut file, b"fmt ", &fmt);
    push_chunk(&mut file, b"bext", &bext);
    push_chunk(&mut file, b"LIST", &info);
    push_chunk(&mut file, b"axml", XMP_PACKET.as_bytes());
    push_chunk(&mut file, b"data", &vec![0u8; 176_400]);

    let riff_size = (file.len() - 8) as u32;
    file[4..8].copy_from_slice(&riff_size.to_le_bytes());
    file
}

#[test]
fn loader_merges_every_embedded_source() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let infile = temp.path().join("tape.wav");
    fs::write(&infile, synthetic_bwf()).expect("failed writing fixture");

    let record = bwf::read_bwf_metadata(&infile).expect("loader should succeed");

    // bext
    assert_eq!(record.get("Description"), "Oral history field master");
    assert_eq!(record.get("OriginatorReference"), "USSHSJS20190502");
    assert_eq!(record.get("OriginationDate"), "2019-05-02");
    assert_eq!(record.get("CodingHistory"), "A=PCM,F=44100,W=16,M=stereo");
    // LIST-INFO
    assert_eq!(record.get("INAM"), "Interview with Jane Smith");
    assert_eq!(record.get("ICRD"), "2019-05-02");
    // technical
    assert_eq!(record.get("SampleRate"), "44100");
    assert_eq!(record.get("Channels"), "2");
    assert_eq!(record.get("Duration"), "00:00:01.000");
    // XMP
    assert_eq!(record.get("form"), "oral history");
    assert_eq!(record.get("FileContent"), "smith_interview_01");
    assert_eq!(record.get("language"), "en - US");
    assert_eq!(record.get("xmp_description"), "Second of three sessions.");
    // absent key stays empty
    assert_eq!(record.get("host"), "");
}

#[test]
fn non_riff_input_is_rejected() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let infile = temp.path().join("notes.txt");
    fs::write(&infile, "not audio at all").expect("failed writing fixture");
    assert!(bwf::read_bwf_metadata(&infile).is_err());
}

#[test]
fn missing_input_is_rejected() {
    assert!(bwf::read_bwf_metadata(Path::new("no/such/file.wav")).is_err());
}

#[test]
fn full_pipeline_writes_a_pbcore_record_next_to_the_input() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let infile = temp.path().join("tape.wav");
    fs::write(&infile, synthetic_bwf()).expect("failed writing fixture");

    let record = bwf::read_bwf_metadata(&infile).expect("loader should succeed");
    let ohms_root = ohms::load_companion(&infile).expect("companion probe should succeed");
    let document = pbcore::build_document(&record, &infile, ohms_root);
    let outfile = pbcore::derived_path(&infile, "_pbcore.xml");
    pbcore::write_document(&document, &outfile).expect("write should succeed");

    let reparsed =
        Element::parse(fs::read(&outfile).expect("output should exist").as_slice())
            .expect("output should be well-formed");
    assert_eq!(
        reparsed
            .get_child("pbcoreTitle")
            .and_then(|el| el.get_text())
            .as_deref(),
        Some("Interview with Jane Smith")
    );
    assert_eq!(
        reparsed
            .get_child("pbcoreInstantiation")
            .and_then(|el| el.get_child("instantiationDuration"))
            .and_then(|el| el.get_text())
            .as_deref(),
        Some("00:00:01")
    );
    assert_eq!(
        reparsed
            .get_child("pbcoreInstantiation")
            .and_then(|el| el.get_child("instantiationLanguage"))
            .and_then(|el| el.get_text())
            .as_deref(),
        Some("en-US")
    );
}
