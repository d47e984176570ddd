/// Object identifier: (object_number, generation_number).
/// Generation is always 0 for documents we produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// PDF object types per PDF 32000-1:2008 Section 7.3, limited to what an
/// invoice document needs.
#[derive(Debug, Clone)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// PDF name object (stored without the leading `/`).
    Name(String),
    /// PDF literal string (stored without the enclosing parens).
    LiteralString(String),
    Array(Vec<PdfObject>),
    /// Key-value pairs. Uses Vec for deterministic output order.
    Dictionary(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn literal_string(s: &str) -> Self {
        PdfObject::LiteralString(s.to_string())
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn stream(dict_entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: dict_entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_id_equality() {
        assert_eq!(ObjId(1, 0), ObjId(1, 0));
        assert_ne!(ObjId(1, 0), ObjId(2, 0));
    }

    #[test]
    fn dict_constructor_preserves_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(ObjId(2, 0))),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                assert_eq!(entries[0].0, "Type");
                assert_eq!(entries[1].0, "Pages");
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn stream_constructor_keeps_data() {
        let data = b"BT /F1 12 Tf ET".to_vec();
        let obj = PdfObject::stream(vec![], data.clone());
        match obj {
            PdfObject::Stream { data: d, .. } => assert_eq!(d, data),
            _ => panic!("expected Stream"),
        }
    }
}
