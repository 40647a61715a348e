//! Slide-deck assembly: a minimal PresentationML (`.pptx`) package.
//!
//! A `.pptx` is a zip of XML parts. The deck written here has one slide
//! master, one blank layout, one theme, and one slide per added image. The
//! image bytes are copied into `ppt/media/` when the slide is added and the
//! caller's buffer is dropped right after, so at most one encoded page is
//! held outside the archive at any time.

use crate::error::ConvertError;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per inch.
pub const EMU_PER_INCH: u64 = 914_400;

/// Slide width: 10 in.
pub const SLIDE_WIDTH_EMU: u64 = 10 * EMU_PER_INCH;

/// Slide height: 7.5 in.
pub const SLIDE_HEIGHT_EMU: u64 = 15 * EMU_PER_INCH / 2;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Position and size of a picture on a slide, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u64,
    pub y: u64,
    pub cx: u64,
    pub cy: u64,
}

impl Placement {
    /// Cover the whole slide.
    pub fn full_slide() -> Self {
        Self {
            x: 0,
            y: 0,
            cx: SLIDE_WIDTH_EMU,
            cy: SLIDE_HEIGHT_EMU,
        }
    }
}

/// Builds a deck slide by slide into an in-memory zip.
pub struct DeckBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    title: String,
    slides: usize,
}

impl DeckBuilder {
    /// Start an empty presentation with a blank-slide layout.
    pub fn new(title: &str) -> Result<Self, ConvertError> {
        let mut builder = Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            title: title.to_string(),
            slides: 0,
        };
        builder.write_part("_rels/.rels", &package_rels())?;
        builder.write_part("ppt/slideMasters/slideMaster1.xml", &slide_master())?;
        builder.write_part(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &slide_master_rels(),
        )?;
        builder.write_part("ppt/slideLayouts/slideLayout1.xml", &blank_layout())?;
        builder.write_part(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &blank_layout_rels(),
        )?;
        builder.write_part("ppt/theme/theme1.xml", THEME)?;
        Ok(builder)
    }

    /// Add a blank slide holding one PNG picture at `placement`.
    ///
    /// Returns the 1-based slide number.
    pub fn add_image_slide(
        &mut self,
        png: Vec<u8>,
        placement: Placement,
    ) -> Result<usize, ConvertError> {
        let n = self.slides + 1;
        let media = format!("ppt/media/image{n}.png");
        self.zip
            .start_file(media.as_str(), stored())
            .map_err(deck_err)?;
        self.zip.write_all(&png).map_err(deck_err)?;
        drop(png);

        self.write_part(&format!("ppt/slides/slide{n}.xml"), &slide(n, placement))?;
        self.write_part(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &slide_rels(n),
        )?;

        self.slides = n;
        debug!("Added slide {}", n);
        Ok(n)
    }

    pub fn slide_count(&self) -> usize {
        self.slides
    }

    /// Write the parts that depend on the slide count and return the package.
    pub fn finish(mut self) -> Result<Vec<u8>, ConvertError> {
        let n = self.slides;
        self.write_part("[Content_Types].xml", &content_types(n))?;
        self.write_part("ppt/presentation.xml", &presentation(n))?;
        self.write_part("ppt/_rels/presentation.xml.rels", &presentation_rels(n))?;
        self.write_part("docProps/core.xml", &core_props(&self.title))?;
        self.write_part("docProps/app.xml", &app_props(n))?;
        let cursor = self.zip.finish().map_err(deck_err)?;
        Ok(cursor.into_inner())
    }

    fn write_part(&mut self, name: &str, xml: &str) -> Result<(), ConvertError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options).map_err(deck_err)?;
        self.zip.write_all(xml.as_bytes()).map_err(deck_err)?;
        Ok(())
    }
}

fn stored() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Stored)
}

fn deck_err<E: std::fmt::Display>(e: E) -> ConvertError {
    ConvertError::DeckFailed(e.to_string())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

// ── Part templates ───────────────────────────────────────────────────────

fn content_types(slides: usize) -> String {
    let pml = "application/vnd.openxmlformats-officedocument.presentationml";
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="{pml}.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{pml}.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{pml}.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for n in 1..=slides {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{pml}.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

/// Slide relationships in `presentation.xml.rels` start after the master
/// (`rId1`) and theme (`rId2`).
fn slide_rel_id(n: usize) -> String {
    format!("rId{}", n + 2)
}

fn presentation(slides: usize) -> String {
    let mut ids = String::new();
    for n in 1..=slides {
        ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            255 + n,
            slide_rel_id(n)
        ));
    }
    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}" type="screen4x3"/><p:notesSz cx="{SLIDE_HEIGHT_EMU}" cy="{SLIDE_WIDTH_EMU}"/></p:presentation>"#
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="{REL_BASE}/theme" Target="theme/theme1.xml"/>"#
    );
    for n in 1..=slides {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{REL_BASE}/slide" Target="slides/slide{n}.xml"/>"#,
            slide_rel_id(n)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn empty_group() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        empty_group()
    )
}

fn slide_master_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_BASE}/theme" Target="../theme/theme1.xml"/></Relationships>"#
    )
}

fn blank_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        empty_group()
    )
}

fn blank_layout_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    )
}

fn slide(n: usize, at: Placement) -> String {
    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{}<p:pic><p:nvPicPr><p:cNvPr id="2" name="Page {n}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        empty_group(),
        at.x,
        at.y,
        at.cx,
        at.cy
    )
}

fn slide_rels(n: usize) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_BASE}/image" Target="../media/image{n}.png"/></Relationships>"#
    )
}

fn core_props(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>pdf2img</dc:creator></cp:coreProperties>"#,
        escape_xml(title)
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>pdf2img</Application><Slides>{slides}</Slides></Properties>"#
    )
}

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(zip: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut s = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn slide_size_is_ten_by_seven_and_a_half_inches() {
        assert_eq!(SLIDE_WIDTH_EMU, 9_144_000);
        assert_eq!(SLIDE_HEIGHT_EMU, 6_858_000);
    }

    #[test]
    fn deck_contains_one_slide_and_media_per_image() {
        let mut deck = DeckBuilder::new("a & b.pdf").unwrap();
        for _ in 0..3 {
            deck.add_image_slide(b"\x89PNG fake".to_vec(), Placement::full_slide())
                .unwrap();
        }
        assert_eq!(deck.slide_count(), 3);
        let bytes = deck.finish().unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for n in 1..=3 {
            assert!(zip.by_name(&format!("ppt/slides/slide{n}.xml")).is_ok());
            assert!(zip.by_name(&format!("ppt/media/image{n}.png")).is_ok());
        }
        assert!(zip.by_name("ppt/slides/slide4.xml").is_err());

        let pres = read_part(&mut zip, "ppt/presentation.xml");
        assert_eq!(pres.matches("<p:sldId ").count(), 3);
        assert!(pres.contains(r#"cx="9144000" cy="6858000""#));

        let core = read_part(&mut zip, "docProps/core.xml");
        assert!(core.contains("a &amp; b.pdf"));
    }

    #[test]
    fn picture_covers_the_full_slide() {
        let mut deck = DeckBuilder::new("x").unwrap();
        deck.add_image_slide(vec![0u8; 8], Placement::full_slide())
            .unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(deck.finish().unwrap())).unwrap();
        let slide = read_part(&mut zip, "ppt/slides/slide1.xml");
        assert!(slide.contains(r#"<a:off x="0" y="0"/><a:ext cx="9144000" cy="6858000"/>"#));
        assert_eq!(slide.matches("<p:pic>").count(), 1);
    }

    #[test]
    fn content_types_list_every_slide() {
        let xml = content_types(2);
        assert!(xml.contains("/ppt/slides/slide1.xml"));
        assert!(xml.contains("/ppt/slides/slide2.xml"));
        assert!(!xml.contains("/ppt/slides/slide3.xml"));
    }
}
