use log::debug;
use serde::Serialize;

mod process_forest;
mod process_table;

pub use process_forest::*;
pub use process_table::*;

pub trait ArtifactExt
where
    Self: Sized + Serialize,
{
    /// WARNING: This doesn't support generic types
    fn name() -> &'static str {
        std::any::type_name::<Self>().rsplit("::").next().unwrap()
    }

    fn encode_to_writer<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    fn save_file_to<P: AsRef<std::path::Path>>(
        &self,
        folder: P,
        filename: &str,
    ) -> anyhow::Result<()> {
        std::fs::create_dir_all(folder.as_ref())?;
        let file = std::fs::File::create(folder.as_ref().join(filename))?;
        self.encode_to_writer(file)?;

        debug!("Saved {} artifact to {:?}", Self::name(), folder.as_ref());
        Ok(())
    }

    fn save_to<P: AsRef<std::path::Path>>(&self, folder: P) -> anyhow::Result<()> {
        self.save_file_to(folder, &format!("{}.json", Self::name()))
    }
}
