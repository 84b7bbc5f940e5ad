//! Built-in province catalogue with OSM relation ids and approximate bounds.

use serde::Serialize;

use super::types::LatLng;

pub struct Province {
    pub slug: &'static str,
    pub name: &'static str,
    /// Nominatim relation id, for direct lookup.
    pub osm_relation: Option<u64>,
    pub center: LatLng,
    /// Rough rectangle in `[lat, lng]`, used when the provider has nothing.
    pub approximate_bounds: &'static [LatLng],
}

const PROVINCES: &[Province] = &[
    Province {
        slug: "son-la", name: "Sơn La", osm_relation: Some(1903291),
        center: [21.3256, 103.9188],
        approximate_bounds: &[[21.8, 103.2], [21.8, 104.6], [20.8, 104.6], [20.8, 103.2]],
    },
    Province {
        slug: "dien-bien", name: "Điện Biên", osm_relation: Some(1903118),
        center: [21.3867, 103.0167],
        approximate_bounds: &[[22.0, 102.4], [22.0, 103.5], [21.0, 103.5], [21.0, 102.4]],
    },
    Province {
        slug: "lai-chau", name: "Lai Châu", osm_relation: Some(1903135),
        center: [22.3964, 103.4583],
        approximate_bounds: &[[22.8, 102.8], [22.8, 103.8], [22.0, 103.8], [22.0, 102.8]],
    },
    Province {
        slug: "lao-cai", name: "Lào Cai", osm_relation: Some(1903085),
        center: [22.4856, 103.975],
        approximate_bounds: &[[22.9, 103.5], [22.9, 104.5], [22.0, 104.5], [22.0, 103.5]],
    },
    Province {
        slug: "ha-giang", name: "Hà Giang", osm_relation: Some(1903067),
        center: [22.8233, 104.9833],
        approximate_bounds: &[[23.4, 104.4], [23.4, 105.6], [22.4, 105.6], [22.4, 104.4]],
    },
    Province {
        slug: "cao-bang", name: "Cao Bằng", osm_relation: Some(1903054),
        center: [22.6667, 106.25],
        approximate_bounds: &[[23.1, 105.6], [23.1, 106.8], [22.2, 106.8], [22.2, 105.6]],
    },
    Province {
        slug: "lang-son", name: "Lạng Sơn", osm_relation: Some(1903039),
        center: [21.8537, 106.7615],
        approximate_bounds: &[[22.4, 106.2], [22.4, 107.2], [21.4, 107.2], [21.4, 106.2]],
    },
    Province {
        slug: "hoa-binh", name: "Hòa Bình", osm_relation: Some(1903335),
        center: [20.8171, 105.3378],
        approximate_bounds: &[[21.2, 104.8], [21.2, 105.8], [20.3, 105.8], [20.3, 104.8]],
    },
    Province {
        slug: "thanh-hoa", name: "Thanh Hóa", osm_relation: Some(1903316),
        center: [19.8067, 105.785],
        approximate_bounds: &[[20.4, 104.8], [20.4, 106.2], [19.2, 106.2], [19.2, 104.8]],
    },
    Province {
        slug: "gia-lai", name: "Gia Lai", osm_relation: Some(1904048),
        center: [13.9833, 108.0],
        approximate_bounds: &[[14.6, 107.4], [14.6, 108.6], [13.2, 108.6], [13.2, 107.4]],
    },
    Province {
        slug: "dak-lak", name: "Đắk Lắk", osm_relation: Some(1904060),
        center: [12.6675, 108.0377],
        approximate_bounds: &[[13.4, 107.4], [13.4, 108.8], [12.0, 108.8], [12.0, 107.4]],
    },
    Province {
        slug: "kon-tum", name: "Kon Tum", osm_relation: Some(1904035),
        center: [14.35, 108.0],
        approximate_bounds: &[[15.0, 107.4], [15.0, 108.4], [14.0, 108.4], [14.0, 107.4]],
    },
    Province {
        slug: "soc-trang", name: "Sóc Trăng", osm_relation: Some(1904180),
        center: [9.6025, 105.9739],
        approximate_bounds: &[[9.9, 105.5], [9.9, 106.3], [9.2, 106.3], [9.2, 105.5]],
    },
    Province {
        slug: "tra-vinh", name: "Trà Vinh", osm_relation: Some(1904155),
        center: [9.9513, 106.3421],
        approximate_bounds: &[[10.2, 106.0], [10.2, 106.7], [9.5, 106.7], [9.5, 106.0]],
    },
    Province {
        slug: "kien-giang", name: "Kiên Giang", osm_relation: Some(1904234),
        center: [10.0125, 105.0809],
        approximate_bounds: &[[10.5, 104.4], [10.5, 105.5], [9.3, 105.5], [9.3, 104.4]],
    },
];

impl Province {
    /// Approximate boundary as a single closed ring.
    pub fn approximate_rings(&self) -> Vec<Vec<LatLng>> {
        let mut ring = self.approximate_bounds.to_vec();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
            if first != *last {
                ring.push(first);
            }
        }
        vec![ring]
    }
}

/// Fold case and Vietnamese diacritics: "Đắk Lắk" → "dak lak".
pub fn fold(s: &str) -> String {
    deunicode::deunicode(s)
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn keys(p: &Province) -> [String; 2] {
    [fold(p.name), fold(p.slug)]
}

/// Look up a province by name or slug: exact, then as whole words inside the query.
/// No typo tolerance; anything else falls through to a name search.
pub fn find_province(query: &str) -> Option<&'static Province> {
    let q = fold(query);
    if q.is_empty() {
        return None;
    }
    if let Some(p) = PROVINCES.iter().find(|p| keys(p).contains(&q)) {
        return Some(p);
    }

    // "tinh son la" → "son la"
    let padded = format!(" {} ", q);
    PROVINCES
        .iter()
        .find(|p| keys(p).iter().any(|k| padded.contains(&format!(" {} ", k))))
}

/// Catalogue entry carrying `osm_id` as its relation.
pub fn find_by_relation(osm_id: u64) -> Option<&'static Province> {
    PROVINCES.iter().find(|p| p.osm_relation == Some(osm_id))
}

/// A catalogue entry for the public province list API.
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceInfo {
    pub slug: String,
    pub name: String,
    pub osm_relation: Option<u64>,
    pub center: LatLng,
}

/// Return the full catalogue.
pub fn province_list() -> Vec<ProvinceInfo> {
    PROVINCES
        .iter()
        .map(|p| ProvinceInfo {
            slug: p.slug.to_string(),
            name: p.name.to_string(),
            osm_relation: p.osm_relation,
            center: p.center,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Đắk Lắk"), "dak lak");
        assert_eq!(fold("  Sơn   La "), "son la");
        assert_eq!(fold("kien-giang"), "kien giang");
    }

    #[test]
    fn test_find_exact() {
        let p = find_province("Sơn La").unwrap();
        assert_eq!(p.slug, "son-la");
        assert_eq!(p.osm_relation, Some(1903291));
    }

    #[test]
    fn test_find_without_diacritics() {
        assert_eq!(find_province("dien bien").unwrap().name, "Điện Biên");
        assert_eq!(find_province("THANH HOA").unwrap().slug, "thanh-hoa");
    }

    #[test]
    fn test_find_by_slug() {
        assert_eq!(find_province("tra-vinh").unwrap().name, "Trà Vinh");
    }

    #[test]
    fn test_find_substring() {
        assert_eq!(find_province("Tỉnh Gia Lai").unwrap().slug, "gia-lai");
    }

    #[test]
    fn test_find_no_near_miss() {
        for name in ["Bắc Giang", "Tiền Giang", "An Giang", "Hậu Giang", "Hà Tĩnh", "Khánh Hòa", "Kon Tom"] {
            assert!(find_province(name).is_none(), "{} matched a catalogue entry", name);
        }
    }

    #[test]
    fn test_find_substring_needs_whole_words() {
        assert!(find_province("Thành phố Hà Giangx").is_none());
        assert_eq!(find_province("Hà Giang province").unwrap().slug, "ha-giang");
    }

    #[test]
    fn test_find_not_found() {
        assert!(find_province("Atlantis").is_none());
        assert!(find_province("   ").is_none());
    }

    #[test]
    fn test_find_by_relation() {
        assert_eq!(find_by_relation(1904234).unwrap().slug, "kien-giang");
        assert!(find_by_relation(42).is_none());
    }

    #[test]
    fn test_approximate_rings_closed() {
        let rings = find_province("Cao Bằng").unwrap().approximate_rings();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn test_catalogue_relations_unique() {
        let list = province_list();
        assert_eq!(list.len(), 15);
        let mut ids: Vec<_> = list.iter().filter_map(|p| p.osm_relation).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 15);
    }
}
