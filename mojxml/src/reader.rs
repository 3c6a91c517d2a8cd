//! Lecture des sources : fichiers XML et archives zip (éventuellement imbriquées)
//!
//! Les archives diffusées par le 法務省 contiennent une archive zip par
//! document, elle-même contenant le XML. Les contenus sont produits à la
//! demande, un document à la fois.

use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{MojxmlError, Result};

/// Itère paresseusement les contenus XML bruts des sources données.
///
/// - `.xml` : le fichier entier
/// - `.zip` : chaque entrée `*.xml`, et chaque entrée `*.zip` dépliée d'un
///   niveau vers son `<nom>.xml`
/// - autre extension : [`MojxmlError::UnsupportedInputType`]
///
/// Les erreurs sont produites comme éléments de l'itérateur, à la position
/// de la source fautive.
pub fn iter_content_xmls<I>(paths: I) -> ContentXmls<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    ContentXmls {
        paths: paths.into_iter(),
        current: None,
    }
}

/// Itérateur retourné par [`iter_content_xmls`]
pub struct ContentXmls<I> {
    paths: I,
    current: Option<ArchiveCursor<BufReader<File>>>,
}

impl<I> Iterator for ContentXmls<I>
where
    I: Iterator,
    I::Item: AsRef<Path>,
{
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = self.current.as_mut() {
                match cursor.next_content() {
                    Some(item) => return Some(item),
                    None => self.current = None,
                }
            }

            let path = self.paths.next()?;
            let path = path.as_ref();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("xml") => {
                    debug!(path = %path.display(), "Reading XML file");
                    return Some(fs::read(path).map_err(MojxmlError::from));
                }
                Some("zip") => {
                    debug!(path = %path.display(), "Opening zip archive");
                    match open_archive(path) {
                        Ok(cursor) => self.current = Some(cursor),
                        Err(e) => return Some(Err(e)),
                    }
                }
                _ => return Some(Err(MojxmlError::UnsupportedInputType(path.to_path_buf()))),
            }
        }
    }
}

fn open_archive(path: &Path) -> Result<ArchiveCursor<BufReader<File>>> {
    let file = File::open(path)?;
    let archive = ZipArchive::new(BufReader::new(file))?;
    Ok(ArchiveCursor {
        archive,
        next_index: 0,
    })
}

/// Position courante dans une archive de premier niveau
struct ArchiveCursor<R> {
    archive: ZipArchive<R>,
    next_index: usize,
}

impl<R: Read + Seek> ArchiveCursor<R> {
    /// Contenu XML suivant de l'archive, `None` une fois l'archive épuisée
    fn next_content(&mut self) -> Option<Result<Vec<u8>>> {
        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            match self.read_xml_entry(index) {
                Ok(Some(bytes)) => return Some(Ok(bytes)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    /// Contenu XML de l'entrée, `None` si l'entrée n'est ni `.xml` ni `.zip`
    fn read_xml_entry(&mut self, index: usize) -> Result<Option<Vec<u8>>> {
        let mut entry = self.archive.by_index(index)?;
        let name = entry.name().to_string();

        if let Some(stem) = name.strip_suffix(".zip") {
            let bytes = read_entry(&mut entry)?;
            extract_nested_xml(bytes, stem).map(Some)
        } else if name.ends_with(".xml") {
            read_entry(&mut entry).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn read_entry(entry: &mut impl Read) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Extrait `<stem>.xml` d'une archive interne.
///
/// Si l'archive interne ne suit pas cette convention de nommage, on se
/// rabat sur sa première entrée `.xml`.
fn extract_nested_xml(bytes: Vec<u8>, stem: &str) -> Result<Vec<u8>> {
    let mut inner = ZipArchive::new(Cursor::new(bytes))?;
    let expected = format!("{}.xml", stem);

    if let Ok(mut entry) = inner.by_name(&expected) {
        return read_entry(&mut entry);
    }

    for index in 0..inner.len() {
        let mut entry = inner.by_index(index)?;
        if entry.name().ends_with(".xml") {
            warn!(
                expected = %expected,
                found = entry.name(),
                "Nested archive without matching XML name, using first XML entry"
            );
            return read_entry(&mut entry);
        }
    }

    Err(zip::result::ZipError::FileNotFound.into())
}

/// Liste récursivement les fichiers `.xml` et `.zip` d'un répertoire.
///
/// Un fichier passé directement est retourné tel quel, quelle que soit son
/// extension (le lecteur la validera). Résultat trié pour un ordre stable.
pub fn collect_sources(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            sources.extend(collect_sources(&entry_path)?);
        } else if entry_path
            .extension()
            .map_or(false, |ext| ext == "xml" || ext == "zip")
        {
            sources.push(entry_path);
        }
    }

    sources.sort();
    Ok(sources)
}
