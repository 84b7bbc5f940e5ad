use crate::geometry::{GeometryResolver, NominatimSource};

pub struct AppState<S = NominatimSource> {
    pub resolver: GeometryResolver<S>,
}
