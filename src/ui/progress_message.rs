/// Events sent from workers to the progress thread.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressMessage {
    Processed {
        file: String,
        components: usize,
    },
    Failed {
        file: String,
    },
    Finished,
}
