//! End-to-end tests: assemble a package, read it back and check it

use docx_container::api::{open_docx_bytes, write_docx_bytes};
use docx_container::{
    content_type_values, part_names, relationship_types, ContainerSettings, FileSource, InMemory,
    MetadataRecord, OptionalPart, PackageAssembler, PackageError, TargetMode,
};
use std::io::Write;
use tempfile::NamedTempFile;

const EXPECTED_ENTRIES: &[&str] = &[
    "[Content_Types].xml",
    "_rels/.rels",
    "docProps/core.xml",
    "docProps/app.xml",
    "word/webSettings.xml",
    "word/document.xml",
    "word/styles.xml",
    "word/fontTable.xml",
    "word/_rels/document.xml.rels",
    "word/_rels/fontTable.xml.rels",
];

#[test]
fn minimal_package_is_structurally_valid() {
    let bytes = write_docx_bytes(PackageAssembler::new()).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();

    assert_eq!(reader.entry_names(), EXPECTED_ENTRIES);
    assert!(reader.check_integrity().unwrap().is_empty());

    let package_rels = reader.relationships(part_names::PACKAGE_RELS).unwrap();
    let targets: Vec<_> = package_rels
        .iter()
        .map(|r| (r.id.as_str(), r.target.as_str()))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("rId1", "word/document.xml"),
            ("rId2", "docProps/core.xml"),
            ("rId3", "docProps/app.xml"),
        ]
    );

    let manifest = reader.content_types().unwrap();
    assert!(manifest.duplicate_extensions.is_empty());
    assert_eq!(
        manifest.content_type_for("word/document.xml"),
        Some(content_type_values::DOCUMENT)
    );
    assert_eq!(
        manifest.content_type_for("_rels/.rels"),
        Some(content_type_values::RELATIONSHIPS)
    );
}

#[test]
fn every_part_starts_with_declaration() {
    let mut assembler = PackageAssembler::new();
    assembler.set_document(r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#);
    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();

    for entry in EXPECTED_ENTRIES {
        let xml = reader.read_part_string(entry).unwrap();
        assert!(
            xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#),
            "{} lacks a declaration",
            entry
        );
    }
}

#[test]
fn images_and_fonts_are_written_and_referenced() {
    let mut image_file = NamedTempFile::new().unwrap();
    image_file.write_all(b"\x89PNG fake").unwrap();

    let mut assembler = PackageAssembler::new();
    let first = assembler
        .add_image("media/image1.png", FileSource(image_file.path().to_path_buf()))
        .unwrap();
    let second = assembler
        .add_image("media/photo.JPEG", InMemory(vec![0xFF, 0xD8]))
        .unwrap();
    let font = assembler
        .add_font("fonts/font1.odttf", vec![0u8; 32])
        .unwrap();
    let link = assembler.document_relationships_mut().add_or_get(
        "https://example.com/",
        relationship_types::HYPERLINK,
        TargetMode::External,
    );

    assert_eq!((first.as_str(), second.as_str()), ("rId4", "rId5"));
    assert_eq!(font, "rId1");
    assert_eq!(link, "rId6");

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    assert!(reader.check_integrity().unwrap().is_empty());

    assert_eq!(
        reader.read_part_bytes("word/media/image1.png").unwrap(),
        b"\x89PNG fake"
    );
    assert_eq!(
        reader.read_part_bytes("word/fonts/font1.odttf").unwrap().len(),
        32
    );

    let rels = reader.relationships(part_names::DOCUMENT_RELS).unwrap();
    let hyperlink = rels.iter().find(|r| r.id == "rId6").unwrap();
    assert_eq!(hyperlink.target_mode, TargetMode::External);

    let font_rels = reader.relationships(part_names::FONT_TABLE_RELS).unwrap();
    assert_eq!(font_rels.len(), 1);
    assert_eq!(font_rels[0].rel_type, relationship_types::FONT);

    let manifest = reader.content_types().unwrap();
    assert_eq!(
        manifest.content_type_for("word/media/photo.JPEG"),
        Some("image/jpeg")
    );
}

#[test]
fn extensionless_resource_is_written_without_default() {
    let mut assembler = PackageAssembler::new();
    assembler
        .add_image("media/README", InMemory(b"notes".to_vec()))
        .unwrap();

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    let content_types = reader.read_part_string(part_names::CONTENT_TYPES).unwrap();

    assert!(!content_types.contains("README"));
    assert!(reader.contains("word/media/README"));
}

#[test]
fn failing_image_source_aborts_write() {
    let mut assembler = PackageAssembler::new();
    assembler
        .add_image("media/ok.png", InMemory(vec![1]))
        .unwrap();
    assembler
        .add_image("media/gone.png", FileSource("/no/such/dir/gone.png".into()))
        .unwrap();

    match write_docx_bytes(assembler) {
        Err(PackageError::ResourceRead { name, source }) => {
            assert_eq!(name, "word/media/gone.png");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("write should fail"),
    }
}

#[test]
fn sample_metadata_scenario() {
    let mut assembler = PackageAssembler::new();
    assembler.set_metadata(
        MetadataRecord::new("Sample")
            .with_author("A")
            .with_author("B")
            .with_tag("x")
            .with_tag("y")
            .with_language("eng"),
    );

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    let core = reader.read_part_string(part_names::CORE_PROPERTIES).unwrap();

    assert!(core.contains("<dc:title>Sample</dc:title>"));
    assert!(core.contains("<dc:creator>A &amp; B</dc:creator>"));
    assert!(core.contains("<cp:keywords>x, y</cp:keywords>"));
    assert!(core.contains("<dc:language>en</dc:language>"));
    assert!(core.contains(r#"<dcterms:created xsi:type="dcterms:W3CDTF">"#));
    assert_eq!(core.matches("<dc:title>").count(), 1);
}

#[test]
fn app_properties_use_settings() {
    let settings = ContainerSettings {
        application_name: "converter".into(),
        application_version: "5.12.0".into(),
        ..ContainerSettings::default()
    };
    let mut assembler = PackageAssembler::with_settings(settings);
    assembler.set_metadata(MetadataRecord::new("Book").with_publisher("Acme"));

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    let app = reader.read_part_string(part_names::APP_PROPERTIES).unwrap();

    assert!(app.contains("<Application>converter</Application>"));
    assert!(app.contains("<AppVersion>05.0012</AppVersion>"));
    assert!(app.contains("<Company>Acme</Company>"));
}

#[test]
fn optional_parts_are_written_with_overrides() {
    let mut assembler = PackageAssembler::new();
    let id = assembler.set_optional_part(OptionalPart::Theme, "<a:theme/>");

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    assert!(reader.check_integrity().unwrap().is_empty());

    let names = reader.entry_names();
    assert_eq!(names.last().map(String::as_str), Some("word/theme/theme1.xml"));

    let manifest = reader.content_types().unwrap();
    assert_eq!(
        manifest.content_type_for("word/theme/theme1.xml"),
        Some(content_type_values::THEME)
    );

    let rels = reader.relationships(part_names::DOCUMENT_RELS).unwrap();
    let theme = rels.iter().find(|r| r.id == id).unwrap();
    assert_eq!(theme.target, "theme/theme1.xml");
}

#[test]
fn pretty_print_produces_indented_parts() {
    let settings = ContainerSettings {
        pretty_print: true,
        ..ContainerSettings::default()
    };
    let bytes = write_docx_bytes(PackageAssembler::with_settings(settings)).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();

    let rels = reader.read_part_string(part_names::PACKAGE_RELS).unwrap();
    assert!(rels.contains("\n  <Relationship "));
    assert!(reader.check_integrity().unwrap().is_empty());
}

#[test]
fn rooted_image_target_resolves_inside_word() {
    let mut assembler = PackageAssembler::new();
    let rooted = assembler
        .add_image("/media/x.png", InMemory(vec![7]))
        .unwrap();
    let plain = assembler
        .add_image("media/x.png", InMemory(vec![8]))
        .unwrap();
    assert_eq!(rooted, plain);

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    assert!(reader.check_integrity().unwrap().is_empty());
    assert_eq!(reader.read_part_bytes("word/media/x.png").unwrap(), vec![8]);

    let rels = reader.relationships(part_names::DOCUMENT_RELS).unwrap();
    let image = rels.iter().find(|r| r.id == rooted).unwrap();
    assert_eq!(image.target, "media/x.png");
}

#[test]
fn shared_image_and_font_target_is_refused_before_write() {
    let mut assembler = PackageAssembler::new();
    assembler
        .add_image("media/a.png", InMemory(vec![1]))
        .unwrap();
    let refused = assembler.add_font("media/a.png", vec![2]);
    assert!(matches!(refused, Err(PackageError::InvalidStructure(_))));

    let bytes = write_docx_bytes(assembler).unwrap();
    let mut reader = open_docx_bytes(&bytes).unwrap();
    assert!(reader.check_integrity().unwrap().is_empty());
    assert_eq!(reader.read_part_bytes("word/media/a.png").unwrap(), vec![1]);
}
