use super::prelude::*;

#[derive(Default)]
pub struct ColorMutations;

#[Object]
impl ColorMutations {
    /// Create a color
    async fn create_color(
        &self,
        ctx: &Context<'_>,
        input: CreateColorInput,
    ) -> Result<ColorResult> {
        let db = ctx.data::<Database>()?;

        match db.colors().create(CreateColor { name: input.name }).await {
            Ok(color) => {
                tracing::info!(color_id = color.id, name = %color.name, "Created color");
                Ok(ColorResult::ok(color))
            }
            Err(e) if e.is_user_facing() => Ok(ColorResult::failed(e.to_string())),
            Err(e) => Err(e.extend()),
        }
    }

    /// Delete a color together with its fruits
    async fn delete_color(&self, ctx: &Context<'_>, id: ID) -> Result<MutationResult> {
        let db = ctx.data::<Database>()?;
        let id = parse_id(&id).extend()?;

        match db.colors().delete(id).await {
            Ok(()) => {
                tracing::info!(color_id = id, "Deleted color");
                Ok(MutationResult::ok())
            }
            Err(e) if e.is_user_facing() => Ok(MutationResult::failed(e.to_string())),
            Err(e) => Err(e.extend()),
        }
    }
}
