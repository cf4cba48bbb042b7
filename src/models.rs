use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Generic placeholder for a field the listing card did not provide.
pub const MISSING: &str = "Brak danych";
/// Placeholder for a listing without a resolvable link.
pub const MISSING_LINK: &str = "Brak linku";
/// Placeholder for a listing without a price element.
pub const MISSING_PRICE: &str = "Brak ceny";

/// Column order of every per-brand output file.
pub const CSV_HEADER: [&str; 14] = [
    "marka",
    "model",
    "opis",
    "cena",
    "moc_km",
    "przebieg",
    "paliwo",
    "skrzynia",
    "rok",
    "pojemnosc",
    "miasto",
    "wojewodztwo",
    "czy_prywatny",
    "link",
];

/// One scraped advertisement.
///
/// Text fields always hold either extracted content or one of the sentinels
/// above. `moc_km` is the only typed field that can be absent; it is written
/// out as [`MISSING`] in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub marka: String,
    pub model: String,
    pub opis: String,
    pub cena: String,
    pub moc_km: Option<u32>,
    pub przebieg: String,
    pub paliwo: String,
    pub skrzynia: String,
    pub rok: String,
    pub pojemnosc: String,
    pub miasto: String,
    pub wojewodztwo: String,
    pub czy_prywatny: bool,
    pub link: String,
}

impl ListingRecord {
    /// A record for a card where nothing could be extracted.
    pub fn missing() -> Self {
        Self {
            marka: MISSING.to_string(),
            model: MISSING.to_string(),
            opis: MISSING.to_string(),
            cena: MISSING_PRICE.to_string(),
            moc_km: None,
            przebieg: MISSING.to_string(),
            paliwo: MISSING.to_string(),
            skrzynia: MISSING.to_string(),
            rok: MISSING.to_string(),
            pojemnosc: MISSING.to_string(),
            miasto: MISSING.to_string(),
            wojewodztwo: MISSING.to_string(),
            czy_prywatny: false,
            link: MISSING_LINK.to_string(),
        }
    }
}

// Field order must match CSV_HEADER.
impl Serialize for ListingRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ListingRecord", CSV_HEADER.len())?;
        state.serialize_field("marka", &self.marka)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("opis", &self.opis)?;
        state.serialize_field("cena", &self.cena)?;

        match self.moc_km {
            Some(power) => state.serialize_field("moc_km", &power)?,
            None => state.serialize_field("moc_km", MISSING)?,
        }

        state.serialize_field("przebieg", &self.przebieg)?;
        state.serialize_field("paliwo", &self.paliwo)?;
        state.serialize_field("skrzynia", &self.skrzynia)?;
        state.serialize_field("rok", &self.rok)?;
        state.serialize_field("pojemnosc", &self.pojemnosc)?;
        state.serialize_field("miasto", &self.miasto)?;
        state.serialize_field("wojewodztwo", &self.wojewodztwo)?;
        state.serialize_field("czy_prywatny", &u8::from(self.czy_prywatny))?;
        state.serialize_field("link", &self.link)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_csv_row(record: &ListingRecord) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(record).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn missing_record_serializes_sentinels() {
        let row = to_csv_row(&ListingRecord::missing());
        assert_eq!(
            row.trim_end(),
            "Brak danych,Brak danych,Brak danych,Brak ceny,Brak danych,Brak danych,\
             Brak danych,Brak danych,Brak danych,Brak danych,Brak danych,Brak danych,0,Brak linku"
        );
    }

    #[test]
    fn power_and_private_flag_serialize_as_numbers() {
        let record = ListingRecord {
            moc_km: Some(258),
            czy_prywatny: true,
            ..ListingRecord::missing()
        };
        let row = to_csv_row(&record);
        let fields: Vec<&str> = row.trim_end().split(',').collect();

        assert_eq!(fields.len(), CSV_HEADER.len());
        assert_eq!(fields[4], "258");
        assert_eq!(fields[12], "1");
    }
}
