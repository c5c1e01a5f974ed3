// Sample document shown when the editor starts without content

/// Exercises every construct the styler understands
pub const SAMPLE_MARKDOWN: &str = "# Heading
This is **bold text**, and this is _italic_.
Some ~~struck out~~ text
***bold italic***
`code`

[A link](https://www.deepl.com/translator)
1. *Item 1*
2. __Item 2__
3. ***Item 3***

- *Item 1*
- __Item 2__
- ***Item 3***";
