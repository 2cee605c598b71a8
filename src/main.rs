use std::{env, fs, path::Path, process::ExitCode};

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use tourlink_lib::{
    link_photos, log_debug, log_error, CameraStore, LinkingConfig, Photo, TourInterval,
    TourPhotoLink,
};

const ENABLE_LOGS: bool = true;

const USAGE: &str = "usage: tourlink <photos.json> <tours.json> [cameras.json]";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkOutput<'a> {
    #[serde(flatten)]
    link: &'a TourPhotoLink,
    photos: &'a [Photo],
}

fn main() -> ExitCode {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match run(env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<()> {
    let (photos_path, tours_path, cameras_path) = match args.as_slice() {
        [photos, tours] => (photos, tours, None),
        [photos, tours, cameras] => (photos, tours, Some(cameras)),
        _ => bail!(USAGE),
    };

    let photos: Vec<Photo> = read_json(Path::new(photos_path))?;
    let tours: Vec<TourInterval> = read_json(Path::new(tours_path))?;

    let store = cameras_path.map(CameraStore::new);
    let mut registry = match &store {
        Some(store) => store.load()?,
        None => Default::default(),
    };

    let linked = link_photos(photos, &tours, &mut registry, &LinkingConfig::default())?;

    // Persist cameras seen for the first time
    if let Some(store) = &store {
        store.save(&registry)?;
    }

    let output: Vec<LinkOutput<'_>> = linked
        .iter()
        .map(|(link, photos)| {
            log_debug!(
                "{} link {}: {} photos, {} with position",
                link.kind.as_str(),
                link.id,
                link.photo_count(),
                link.geo_photo_count
            );
            LinkOutput { link, photos }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}
