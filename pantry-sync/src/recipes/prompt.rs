//! Prompt templates

/// Full recipe for a named dish
pub fn full_recipe(dish: &str) -> String {
    format!(
        "Create a practical cooking recipe for '{dish}'.\n\
         Strictly follow this format in English:\n\n\
         **Ingredients & Seasonings:**\n\
         [List detailed ingredients and seasonings with quantities]\n\n\
         **Missing/Key Ingredients:**\n\
         [Mention main items needed]\n\n\
         **Cooking Instructions:**\n\
         [Detailed step-by-step guide]\n\n\
         IMPORTANT: Direct cooking steps only. No introduction."
    )
}

/// One dish from the given ingredients
pub fn recommendation(ingredients: &[&str]) -> String {
    let items = ingredients.join(", ");
    format!(
        "I have these ingredients: {items}.\n\
         Task: Recommend ONE best dish I can make.\n\n\
         **Dish Name:** [Name]\n\n\
         **Ingredients from My Fridge:**\n\
         [List items I already have]\n\n\
         **Missing Ingredients:**\n\
         [List essential ingredients I may need]\n\n\
         **Cooking Instructions:**\n\
         [Detailed step-by-step guide]\n\n\
         IMPORTANT: Do NOT include introduction."
    )
}
