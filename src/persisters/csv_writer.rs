use std::path::Path;

use csv::Writer;

use crate::model::film::PosterFilm;

pub struct CsvWriter {}

impl CsvWriter {
    /// Writes films in a layout Letterboxd's own importer accepts.
    pub fn save_films_to_csv(
        films: &[PosterFilm],
        file_name: impl AsRef<Path>,
    ) -> Result<(), csv::Error> {
        let mut wrt = Writer::from_path(file_name.as_ref())?;
        wrt.write_record(PosterFilm::csv_titles())?;
        for film in films {
            wrt.write_record(film.to_csvable_array())?;
        }
        wrt.flush()?;

        Ok(())
    }
}
