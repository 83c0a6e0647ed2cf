use super::prelude::*;

#[derive(Default)]
pub struct ColorQueries;

#[Object]
impl ColorQueries {
    /// All colors, ordered by id unless `orderBy` says otherwise
    async fn colors(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<ColorWhereInput>,
        order_by: Option<Vec<ColorOrderByInput>>,
        page: Option<PageInput>,
    ) -> Result<Vec<Color>> {
        let db = ctx.data::<Database>()?;

        let mut query = Color::query(db.pool()).order_by(order_by.unwrap_or_default());
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        if let Some(page) = page {
            query = query.paginate(page);
        }

        query.fetch_all().await.map_err(AppError::from).extend()
    }

    /// Get a color by ID
    async fn color(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Color>> {
        let db = ctx.data::<Database>()?;
        let id = parse_id(&id).extend()?;
        Color::get(db.pool(), id).await.map_err(AppError::from).extend()
    }
}
