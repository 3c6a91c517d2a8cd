//! Génération de documents 地図XML synthétiques pour les tests

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Paramètres d'un document synthétique
pub struct Sheet<'a> {
    pub map_name: &'a str,
    pub crs: &'a str,
    /// Nombre de parcelles ordinaires
    pub parcels: usize,
    /// Nombre de parcelles 地区外 ajoutées en fin de document
    pub chikugai: usize,
}

impl Default for Sheet<'_> {
    fn default() -> Self {
        Self {
            map_name: "試験図",
            crs: "公共座標9系",
            parcels: 4,
            chikugai: 0,
        }
    }
}

impl Sheet<'_> {
    /// Document XML : une grille de carrés de 10 m, un 筆 par carré.
    ///
    /// Les sommets pairs passent par un `GM_Point`, les impairs sont directs.
    pub fn xml(&self) -> String {
        let mut spatial = String::new();
        let mut subject = String::new();

        for i in 0..self.parcels + self.chikugai {
            let north = -35_000.0 + (i / 10) as f64 * 10.0;
            let east = -6_000.0 + (i % 10) as f64 * 10.0;
            let corners = [
                (north, east),
                (north + 10.0, east),
                (north + 10.0, east + 10.0),
                (north, east + 10.0),
            ];

            let mut members = String::new();
            for (k, (x, y)) in corners.iter().enumerate() {
                let position = if k % 2 == 0 {
                    spatial.push_str(&format!(
                        r#"<zmn:GM_Point id="P{i}-{k}"><zmn:GM_Point.position><zmn:DirectPosition><zmn:X>{x:.3}</zmn:X><zmn:Y>{y:.3}</zmn:Y></zmn:DirectPosition></zmn:GM_Point.position></zmn:GM_Point>"#
                    ));
                    format!(
                        r#"<zmn:GM_Position.indirect><zmn:GM_PointRef.point idref="P{i}-{k}"/></zmn:GM_Position.indirect>"#
                    )
                } else {
                    format!(
                        r#"<zmn:GM_Position.direct><zmn:X>{x:.3}</zmn:X><zmn:Y>{y:.3}</zmn:Y></zmn:GM_Position.direct>"#
                    )
                };
                spatial.push_str(&format!(
                    r#"<zmn:GM_Curve id="C{i}-{k}"><zmn:GM_Curve.segment><zmn:GM_LineString><zmn:GM_LineString.controlPoint><zmn:GM_PointArray><zmn:GM_PointArray.column>{position}</zmn:GM_PointArray.column><zmn:GM_PointArray.column><zmn:GM_Position.direct><zmn:X>0</zmn:X><zmn:Y>0</zmn:Y></zmn:GM_Position.direct></zmn:GM_PointArray.column></zmn:GM_PointArray></zmn:GM_LineString.controlPoint></zmn:GM_LineString></zmn:GM_Curve.segment></zmn:GM_Curve>"#
                ));
                members.push_str(&format!(
                    r#"<zmn:GM_CompositeCurve.generator idref="C{i}-{k}"/>"#
                ));
            }

            spatial.push_str(&format!(
                r#"<zmn:GM_Surface id="S{i}"><zmn:GM_Surface.patch><zmn:GM_Polygon><zmn:GM_Polygon.boundary><zmn:GM_SurfaceBoundary><zmn:GM_SurfaceBoundary.exterior><zmn:GM_Ring>{members}</zmn:GM_Ring></zmn:GM_SurfaceBoundary.exterior></zmn:GM_SurfaceBoundary></zmn:GM_Polygon.boundary></zmn:GM_Polygon></zmn:GM_Surface.patch></zmn:GM_Surface>"#
            ));

            let chiban = if i < self.parcels {
                format!("{}-1", i + 1)
            } else {
                "地区外".to_string()
            };
            subject.push_str(&format!(
                r#"<筆 id="{name}-H{i}"><大字コード>001</大字コード><大字名>本町</大字名><地番>{chiban}</地番><精度区分>甲二</精度区分><座標値種別>測量成果</座標値種別><形状 idref="S{i}"/></筆>"#,
                name = self.map_name
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<地図 xmlns="http://www.moj.go.jp/MINJI/tizuxml" xmlns:zmn="http://www.moj.go.jp/MINJI/tizuzumen">
<version>1.0</version>
<地図名>{map_name}</地図名>
<市区町村コード>13101</市区町村コード>
<市区町村名>千代田区</市区町村名>
<座標系>{crs}</座標系>
<測地系判別>変換</測地系判別>
<空間属性>{spatial}</空間属性>
<主題属性>{subject}</主題属性>
</地図>"#,
            map_name = self.map_name,
            crs = self.crs,
        )
    }
}

/// Archive zip en mémoire
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Archive au format de diffusion : un zip interne par document
pub fn distribution_zip(documents: &[(&str, String)]) -> Vec<u8> {
    let inner: Vec<(String, Vec<u8>)> = documents
        .iter()
        .map(|(stem, xml)| {
            let name = format!("{}.xml", stem);
            (
                format!("{}.zip", stem),
                zip_bytes(&[(name.as_str(), xml.as_bytes())]),
            )
        })
        .collect();
    let entries: Vec<(&str, &[u8])> = inner
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();
    zip_bytes(&entries)
}
